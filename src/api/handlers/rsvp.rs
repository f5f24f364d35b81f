use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{GuestRsvpRequest, RsvpRequest};
use crate::api::dtos::responses::{RsvpCounts, RsvpListResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::event::Event;
use crate::domain::models::rsvp::{Rsvp, RsvpStatus};
use crate::domain::services::password::validate_email;
use crate::error::AppError;
use crate::state::AppState;

pub async fn upsert_rsvp(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<RsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status: RsvpStatus = payload.status.parse().map_err(AppError::Validation)?;
    let event = find_stored_event(&state, &event_id).await?;

    let rsvp = state.rsvp_repo
        .upsert_for_user(&Rsvp::for_user(event.id.clone(), user.id.clone(), status), event.max_attendees)
        .await?;

    info!(event_id = %event.id, status = %rsvp.status, "RSVP recorded");

    Ok(Json(rsvp))
}

pub async fn guest_rsvp(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    Json(payload): Json<GuestRsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status: RsvpStatus = payload.status.parse().map_err(AppError::Validation)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".into()));
    }
    let email = payload.email.trim().to_lowercase();
    validate_email(&email)?;

    let event = find_stored_event(&state, &event_id).await?;

    let rsvp = state.rsvp_repo
        .create_guest(&Rsvp::for_guest(event.id.clone(), name.to_string(), email, status), event.max_attendees)
        .await?;

    info!(event_id = %event.id, rsvp_id = %rsvp.id, "Guest RSVP recorded");

    Ok((StatusCode::CREATED, Json(rsvp)))
}

pub async fn list_rsvps(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = find_stored_event(&state, &event_id).await?;
    let rsvps = state.rsvp_repo.list_by_event(&event.id).await?;
    let counts = count_by_status(&rsvps);

    Ok(Json(RsvpListResponse { rsvps, counts }))
}

/// Provider events are never stored, so they resolve to 404 here.
pub(crate) async fn find_stored_event(state: &AppState, event_id: &str) -> Result<Event, AppError> {
    state.event_repo.find_by_id(event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))
}

pub fn count_by_status(rsvps: &[Rsvp]) -> RsvpCounts {
    rsvps.iter().fold(RsvpCounts::default(), |mut counts, rsvp| {
        match rsvp.status.parse::<RsvpStatus>() {
            Ok(RsvpStatus::Attending) => counts.attending += 1,
            Ok(RsvpStatus::Maybe) => counts.maybe += 1,
            Ok(RsvpStatus::NotAttending) => counts.not_attending += 1,
            Err(_) => {}
        }
        counts
    })
}
