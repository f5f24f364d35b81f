use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::FriendRequestView;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::friendship::{Friendship, STATUS_PENDING};
use crate::domain::models::user::PublicUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_friends(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let friendships = state.friendship_repo.list_accepted(&user.id).await?;
    let ids: Vec<String> = friendships.iter()
        .map(|f| f.other_party(&user.id).to_string())
        .collect();

    let friends: Vec<PublicUser> = state.user_repo.find_many(&ids).await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(Json(friends))
}

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let pending = state.friendship_repo.list_incoming(&user.id).await?;
    let ids: Vec<String> = pending.iter().map(|f| f.requester_id.clone()).collect();

    let mut requesters: HashMap<String, PublicUser> = state.user_repo.find_many(&ids).await?
        .into_iter()
        .map(|u| (u.id.clone(), PublicUser::from(u)))
        .collect();

    let views: Vec<FriendRequestView> = pending.into_iter()
        .filter_map(|f| {
            requesters.remove(&f.requester_id).map(|requester| FriendRequestView {
                id: f.id,
                requester,
                created_at: f.created_at,
            })
        })
        .collect();

    Ok(Json(views))
}

pub async fn send_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(target_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if target_id == user.id {
        return Err(AppError::Validation("You cannot befriend yourself".into()));
    }
    if state.user_repo.find_by_id(&target_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }
    if state.friendship_repo.find_between(&user.id, &target_id).await?.is_some() {
        return Err(AppError::Conflict("A friendship or request already exists".into()));
    }

    let created = state.friendship_repo
        .create(&Friendship::request(user.id.clone(), target_id))
        .await?;

    info!(friendship_id = %created.id, "Friend request sent");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn accept_request(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(requester_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let pending = state.friendship_repo.find_between(&user.id, &requester_id).await?
        .filter(|f| f.status == STATUS_PENDING && f.requester_id == requester_id && f.addressee_id == user.id)
        .ok_or(AppError::NotFound("Friend request not found".into()))?;

    let accepted = state.friendship_repo.accept(&pending.id).await?;
    state.user_repo.adjust_counters(&accepted.requester_id, 0, 0, 1).await?;
    state.user_repo.adjust_counters(&accepted.addressee_id, 0, 0, 1).await?;

    info!(friendship_id = %accepted.id, "Friend request accepted");

    Ok(Json(accepted))
}

/// Removes an accepted friend, or withdraws/declines a pending request.
pub async fn remove_friend(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(other_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let friendship = state.friendship_repo.find_between(&user.id, &other_id).await?
        .ok_or(AppError::NotFound("Friendship not found".into()))?;

    state.friendship_repo.delete(&friendship.id).await?;

    if friendship.is_accepted() {
        state.user_repo.adjust_counters(&friendship.requester_id, 0, 0, -1).await?;
        state.user_repo.adjust_counters(&friendship.addressee_id, 0, 0, -1).await?;
    }

    info!(friendship_id = %friendship.id, "Friendship removed");

    Ok(StatusCode::NO_CONTENT)
}
