use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dtos::requests::FavoriteRequest;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::EventSource;
use crate::domain::models::favorite::Favorite;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let favorites = state.favorite_repo.list_by_user(&user.id).await?;
    Ok(Json(favorites))
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<FavoriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let source: EventSource = payload.external_source.parse().map_err(AppError::Validation)?;
    let event_id = payload.event_id.trim();
    if event_id.is_empty() {
        return Err(AppError::Validation("eventId is required".into()));
    }

    // Stored events must exist; provider events are taken at the client's word.
    if !source.is_external() && state.event_repo.find_by_id(event_id).await?.is_none() {
        return Err(AppError::NotFound("Event not found".into()));
    }

    let favorite = Favorite::new(
        user.id,
        event_id.to_string(),
        source.as_str().to_string(),
        payload.title.trim().to_string(),
        payload.start_date.trim().to_string(),
    );
    let saved = state.favorite_repo.add(&favorite).await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((source, event_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let source: EventSource = source.parse().map_err(AppError::Validation)?;
    state.favorite_repo.remove(&user.id, source.as_str(), &event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
