use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::user::User;
use crate::domain::services::auth_service::SESSION_COOKIE;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{debug, Span};

pub struct MaybeAuthUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(cookies) = parts.extensions.get::<Cookies>() else {
            return Ok(MaybeAuthUser(None));
        };

        let session_id = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(MaybeAuthUser(None)),
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        // Stale or unknown session -> treat as guest
        let Some(user_id) = app_state.auth_service.resolve(&session_id).await? else {
            debug!("MaybeAuth: session not found or expired");
            return Ok(MaybeAuthUser(None));
        };

        let user = app_state.user_repo.find_by_id(&user_id).await?;
        if let Some(user) = &user {
            Span::current().record("user_id", &user.id);
        }

        Ok(MaybeAuthUser(user))
    }
}
