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
use tracing::Span;

/// A request carrying a live session. Rejects with 401 otherwise.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(AppError::Internal)?;

        let session_id = cookies.get(SESSION_COOKIE)
            .ok_or(AppError::Unauthorized)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let user_id = app_state.auth_service.resolve(&session_id).await?
            .ok_or(AppError::Unauthorized)?;

        let user = app_state.user_repo.find_by_id(&user_id).await?
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("user_id", &user.id);

        Ok(AuthUser(user))
    }
}
