use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{CommentRequest, GuestCommentRequest};
use crate::api::extractors::auth::AuthUser;
use crate::api::handlers::rsvp::find_stored_event;
use crate::domain::models::comment::Comment;
use crate::domain::services::password::validate_email;
use crate::error::AppError;
use crate::state::AppState;

pub const MAX_COMMENT_LEN: usize = 2000;

pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = find_stored_event(&state, &event_id).await?;
    let comments = state.comment_repo.list_by_event(&event.id).await?;
    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut comment = build_comment(&state, &event_id, &payload.content, payload.parent_id).await?;
    comment.user_id = Some(user.id);

    let created = state.comment_repo.create(&comment).await?;
    info!(event_id = %created.event_id, comment_id = %created.id, "Comment posted");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_guest_comment(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    Json(payload): Json<GuestCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    let email = payload.email.trim().to_lowercase();
    validate_email(&email)?;

    let mut comment = build_comment(&state, &event_id, &payload.content, payload.parent_id).await?;
    comment.guest_name = Some(name.to_string());
    comment.guest_email = Some(email);

    let created = state.comment_repo.create(&comment).await?;
    info!(event_id = %created.event_id, comment_id = %created.id, "Guest comment posted");

    Ok((StatusCode::CREATED, Json(created)))
}

async fn build_comment(
    state: &AppState,
    event_id: &str,
    content: &str,
    parent_id: Option<String>,
) -> Result<Comment, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Comment cannot be empty".into()));
    }
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(AppError::Validation(format!("Comment exceeds {} characters", MAX_COMMENT_LEN)));
    }

    let event = find_stored_event(state, event_id).await?;

    // Replies must stay within the same event's thread
    if let Some(parent_id) = &parent_id {
        let parent = state.comment_repo.find_by_id(parent_id).await?
            .ok_or(AppError::NotFound("Parent comment not found".into()))?;
        if parent.event_id != event.id {
            return Err(AppError::Validation("Parent comment belongs to another event".into()));
        }
    }

    Ok(Comment::new(event.id, parent_id, content.to_string()))
}
