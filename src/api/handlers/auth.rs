use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::{LoginRequest, RegisterRequest};
use crate::api::extractors::{auth::AuthUser, client_ip::ClientIp};
use crate::domain::models::user::{PublicUser, User};
use crate::domain::services::auth_service::SESSION_COOKIE;
use crate::domain::services::password::{
    hash_password, validate_email, validate_password_strength, verify_login,
};
use crate::error::AppError;
use crate::state::AppState;
use serde_json::json;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use tracing::{info, warn};

pub async fn register(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    info!(target: "security", event = "register_attempt", ip = %ip, "Registration attempt");

    if let Err(e) = validate_registration(&payload, &email) {
        warn!(target: "security", event = "register_failure", reason = "validation", ip = %ip, "Registration rejected");
        return Err(e);
    }

    if state.user_repo.find_by_email(&email).await?.is_some() {
        warn!(target: "security", event = "register_failure", reason = "duplicate_email", ip = %ip, "Registration rejected");
        return Err(AppError::Conflict("An account with this email already exists".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let mut user = User::new(
        email,
        password_hash,
        payload.first_name.trim().to_string(),
        payload.last_name.trim().to_string(),
    );
    user.university = payload.university.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
    user.graduation_year = payload.graduation_year;

    // A concurrent duplicate loses on the unique index and surfaces as 409.
    let user = state.user_repo.create(&user).await?;

    let session_id = state.auth_service.create_session(&user.id).await?;
    set_session_cookie(&cookies, &state, session_id);

    info!(target: "security", event = "register_success", user_id = %user.id, ip = %ip, "User registered");

    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.trim().to_lowercase();
    let limiter_key = format!("login:{}:{}", ip, email);
    info!(target: "security", event = "login_attempt", ip = %ip, "Login attempt");

    let decision = state.rate_limiter.check_and_record(
        &limiter_key,
        state.config.login_max_attempts,
        std::time::Duration::from_secs(state.config.login_window_secs),
    ).await?;

    if !decision.allowed {
        warn!(
            target: "security",
            event = "login_rate_limited",
            ip = %ip,
            retry_after_secs = decision.retry_after_secs,
            "Login rate limit exceeded"
        );
        return Err(AppError::RateLimited);
    }

    let user = state.user_repo.find_by_email(&email).await?;
    let verified = verify_login(&payload.password, user.as_ref().map(|u| u.password_hash.as_str()))?;

    let user = match user {
        Some(user) if verified => user,
        Some(user) => {
            warn!(target: "security", event = "login_failure", reason = "bad_password", user_id = %user.id, ip = %ip, "Login failed");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!(target: "security", event = "login_failure", reason = "unknown_email", ip = %ip, "Login failed");
            return Err(AppError::InvalidCredentials);
        }
    };

    state.rate_limiter.reset(&limiter_key).await?;

    let session_id = state.auth_service.create_session(&user.id).await?;
    set_session_cookie(&cookies, &state, session_id);

    info!(target: "security", event = "login_success", user_id = %user.id, ip = %ip, "User logged in");

    Ok(Json(PublicUser::from(user)))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE)
        && let Err(e) = state.auth_service.destroy(cookie.value()).await
    {
        warn!("Failed to destroy session on logout: {:?}", e);
    }

    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());

    info!(target: "security", event = "logout", ip = %ip, "User logged out");

    Ok(Json(json!({ "message": "Logged out" })))
}

pub async fn current_user(AuthUser(user): AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(PublicUser::from(user)))
}

fn validate_registration(payload: &RegisterRequest, email: &str) -> Result<(), AppError> {
    validate_email(email)?;
    validate_password_strength(&payload.password)?;
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(AppError::Validation("First and last name are required".into()));
    }
    Ok(())
}

fn set_session_cookie(cookies: &Cookies, state: &AppState, session_id: String) {
    let ttl = state.auth_service.session_ttl();

    let mut cookie = Cookie::new(SESSION_COOKIE, session_id);
    cookie.set_http_only(true);
    cookie.set_secure(state.config.is_production());
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(ttl.num_seconds()));
    cookies.add(cookie);
}
