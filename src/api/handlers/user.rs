use axum::{extract::{Path, State}, response::IntoResponse, Json};
use crate::api::dtos::requests::UpdateProfileRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::PublicUser;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(mut user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(first_name) = payload.first_name {
        let first_name = first_name.trim();
        if first_name.is_empty() {
            return Err(AppError::Validation("First name cannot be empty".into()));
        }
        user.first_name = first_name.to_string();
    }
    if let Some(last_name) = payload.last_name {
        let last_name = last_name.trim();
        if last_name.is_empty() {
            return Err(AppError::Validation("Last name cannot be empty".into()));
        }
        user.last_name = last_name.to_string();
    }
    if let Some(year) = payload.graduation_year {
        if !(1900..=2100).contains(&year) {
            return Err(AppError::Validation("Graduation year is out of range".into()));
        }
        user.graduation_year = Some(year);
    }

    // Empty strings clear optional fields
    let clean = |v: String| Some(v.trim().to_string()).filter(|v| !v.is_empty());
    if let Some(v) = payload.university { user.university = clean(v); }
    if let Some(v) = payload.bio { user.bio = clean(v); }
    if let Some(v) = payload.profile_image_url { user.profile_image_url = clean(v); }
    if let Some(v) = payload.instagram_handle { user.instagram_handle = clean(v); }
    if let Some(v) = payload.twitter_handle { user.twitter_handle = clean(v); }
    if let Some(v) = payload.linkedin_url { user.linkedin_url = clean(v); }

    let updated = state.user_repo.update_profile(&user).await?;
    info!("Profile updated for user {}", updated.id);

    Ok(Json(PublicUser::from(updated)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_repo.find_by_id(&user_id).await?
        .ok_or(AppError::NotFound("User not found".into()))?;
    Ok(Json(PublicUser::from(user)))
}

pub async fn list_user_events(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.user_repo.find_by_id(&user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    let events = state.event_repo.list_by_host(&user_id).await?;
    Ok(Json(events))
}
