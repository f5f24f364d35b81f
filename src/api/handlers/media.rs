use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::MediaRequest;
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::rsvp::find_stored_event;
use crate::domain::models::media::{is_valid_media_type, Media};
use crate::domain::services::password::validate_email;
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_media(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<MediaRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut media = build_media(&state, payload).await?;
    media.user_id = Some(user.id);

    let created = state.media_repo.create(&media).await?;
    info!(media_id = %created.id, "Media attached");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_guest_media(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<MediaRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.take().map(|n| n.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    let email = payload.email.take().map(|e| e.trim().to_lowercase()).unwrap_or_default();
    validate_email(&email)?;

    let mut media = build_media(&state, payload).await?;
    media.guest_name = Some(name);
    media.guest_email = Some(email);

    let created = state.media_repo.create(&media).await?;
    info!(media_id = %created.id, "Guest media attached");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_event_media(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = find_stored_event(&state, &event_id).await?;
    let media = state.media_repo.list_by_event(&event.id).await?;
    Ok(Json(media))
}

async fn build_media(state: &AppState, payload: MediaRequest) -> Result<Media, AppError> {
    if !is_valid_media_type(&payload.media_type) {
        return Err(AppError::Validation("mediaType must be 'image' or 'video'".into()));
    }
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url is required".into()));
    }

    let (event_id, comment_id) = match (payload.event_id, payload.comment_id) {
        (None, None) => {
            return Err(AppError::Validation("eventId or commentId is required".into()));
        }
        (Some(event_id), None) => (Some(find_stored_event(state, &event_id).await?.id), None),
        (event_id, Some(comment_id)) => {
            let comment = state.comment_repo.find_by_id(&comment_id).await?
                .ok_or(AppError::NotFound("Comment not found".into()))?;
            if event_id.as_ref().is_some_and(|e| *e != comment.event_id) {
                return Err(AppError::Validation("Comment belongs to another event".into()));
            }
            (Some(comment.event_id), Some(comment.id))
        }
    };

    let caption = payload.caption.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    Ok(Media::new(event_id, comment_id, payload.media_type, url.to_string(), caption))
}
