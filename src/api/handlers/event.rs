use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::dtos::requests::{CreateEventRequest, SearchParams, UpdateEventRequest};
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::domain::models::event::{Event, EventCategory, EventSource};
use crate::domain::ports::ProviderQuery;
use crate::domain::services::search::parse_timestamp;
use crate::error::AppError;
use crate::state::AppState;

pub const DEFAULT_RADIUS_MILES: f64 = 25.0;

pub async fn search_events(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = parse_search_params(params)?;
    let outcome = state.search_service
        .search(&query, user.as_ref().map(|u| u.id.as_str()))
        .await?;

    info!(
        results = outcome.events.len(),
        partial = outcome.partial,
        "Event search completed"
    );

    Ok(Json(outcome))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.event_repo.find_by_id(&event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let title = required_text(&payload.title, "Title")?;
    let location = required_text(&payload.location, "Location")?;
    let category: EventCategory = payload.category.parse().map_err(AppError::Validation)?;

    if payload.start_date <= Utc::now() {
        return Err(AppError::Validation("Event must start in the future".into()));
    }
    if let Some(end) = payload.end_date
        && end < payload.start_date
    {
        return Err(AppError::Validation("Event cannot end before it starts".into()));
    }
    validate_coordinates(payload.latitude, payload.longitude)?;
    validate_price(payload.price)?;
    validate_capacity(payload.max_attendees)?;

    if state.config.stripe_secret_key.is_some() {
        verify_platform_fee(&state, &user.id, payload.payment_intent_id.as_deref()).await?;
    }

    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4().to_string(),
        title,
        description: payload.description.trim().to_string(),
        category: category.as_str().to_string(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        location,
        latitude: payload.latitude,
        longitude: payload.longitude,
        host_id: Some(user.id.clone()),
        price: payload.price,
        max_attendees: payload.max_attendees,
        is_public: payload.is_public.unwrap_or(true),
        image_url: payload.image_url,
        external_id: None,
        external_source: EventSource::User.as_str().to_string(),
        ticket_url: None,
        min_price: None,
        max_price: None,
        payment_intent_id: payload.payment_intent_id,
        created_at: now,
        updated_at: now,
    };

    let created = state.event_repo.create(&event).await?;
    state.user_repo.adjust_counters(&user.id, 1, 0, 0).await?;

    info!(event_id = %created.id, host_id = %user.id, "Event created");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = find_owned_event(&state, &event_id, &user.id).await?;

    if let Some(title) = payload.title { event.title = required_text(&title, "Title")?; }
    if let Some(location) = payload.location { event.location = required_text(&location, "Location")?; }
    if let Some(description) = payload.description { event.description = description.trim().to_string(); }
    if let Some(category) = payload.category {
        let category: EventCategory = category.parse().map_err(AppError::Validation)?;
        event.category = category.as_str().to_string();
    }
    if let Some(start) = payload.start_date { event.start_date = start; }
    if payload.end_date.is_some() { event.end_date = payload.end_date; }
    if let Some(end) = event.end_date
        && end < event.start_date
    {
        return Err(AppError::Validation("Event cannot end before it starts".into()));
    }
    if payload.latitude.is_some() || payload.longitude.is_some() {
        validate_coordinates(payload.latitude, payload.longitude)?;
        event.latitude = payload.latitude;
        event.longitude = payload.longitude;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        event.price = price;
    }
    if payload.max_attendees.is_some() {
        validate_capacity(payload.max_attendees)?;
        event.max_attendees = payload.max_attendees;
    }
    if let Some(is_public) = payload.is_public { event.is_public = is_public; }
    if payload.image_url.is_some() { event.image_url = payload.image_url; }
    event.updated_at = Utc::now();

    let updated = state.event_repo.update(&event).await?;
    info!(event_id = %updated.id, "Event updated");

    Ok(Json(updated))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = find_owned_event(&state, &event_id, &user.id).await?;

    state.event_repo.delete(&event.id).await?;
    state.user_repo.adjust_counters(&user.id, -1, 0, 0).await?;

    info!(event_id = %event.id, "Event deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Payments are enabled: the caller must present a succeeded intent for the
/// exact platform fee that was created for them. Reuse is stopped by the
/// unique index on `events.payment_intent_id`.
async fn verify_platform_fee(state: &AppState, user_id: &str, intent_id: Option<&str>) -> Result<(), AppError> {
    let Some(intent_id) = intent_id.map(str::trim).filter(|id| !id.is_empty()) else {
        return Err(AppError::Validation("Platform fee payment is required to host an event".into()));
    };

    if state.event_repo.find_by_payment_intent(intent_id).await?.is_some() {
        warn!(intent_id = %intent_id, user_id = %user_id, "Platform fee intent reused");
        return Err(AppError::Conflict("This payment has already been used".into()));
    }

    let intent = state.payment_service.retrieve_intent(intent_id).await?;
    if !intent.covers_fee(user_id, state.config.platform_fee_cents, &state.config.platform_fee_currency) {
        warn!(
            intent_id = %intent_id,
            status = %intent.status,
            amount = intent.amount,
            "Event creation without a valid platform fee"
        );
        return Err(AppError::Validation("Platform fee payment has not completed".into()));
    }
    Ok(())
}

async fn find_owned_event(state: &AppState, event_id: &str, user_id: &str) -> Result<Event, AppError> {
    let event = state.event_repo.find_by_id(event_id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if !event.is_hosted_by(user_id) {
        return Err(AppError::Forbidden("Only the host can modify this event".into()));
    }
    Ok(event)
}

/// Turns raw query parameters into a validated provider query.
pub fn parse_search_params(params: SearchParams) -> Result<ProviderQuery, AppError> {
    let lat = parse_finite(params.lat.as_deref(), "lat")?
        .ok_or(AppError::Validation("lat and lng are required".into()))?;
    let lng = parse_finite(params.lng.as_deref(), "lng")?
        .ok_or(AppError::Validation("lat and lng are required".into()))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::Validation("lat/lng out of range".into()));
    }

    let radius_miles = parse_finite(params.radius.as_deref(), "radius")?.unwrap_or(DEFAULT_RADIUS_MILES);
    if radius_miles <= 0.0 {
        return Err(AppError::Validation("radius must be positive".into()));
    }

    let category = match non_empty(params.category) {
        Some(raw) => Some(raw.parse::<EventCategory>().map_err(AppError::Validation)?),
        None => None,
    };

    let parse_date = |raw: Option<String>, name: &str| -> Result<_, AppError> {
        match non_empty(raw) {
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| AppError::Validation(format!("Invalid {}", name))),
            None => Ok(None),
        }
    };
    let start_date = parse_date(params.start_date, "startDate")?;
    let end_date = parse_date(params.end_date, "endDate")?;

    if let (Some(start), Some(end)) = (start_date, end_date)
        && end < start
    {
        return Err(AppError::Validation("endDate must not precede startDate".into()));
    }

    Ok(ProviderQuery {
        lat,
        lng,
        radius_miles,
        category,
        keyword: non_empty(params.keyword),
        start_date,
        end_date,
    })
}

fn parse_finite(raw: Option<&str>, name: &str) -> Result<Option<f64>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(AppError::Validation(format!("{} must be a finite number", name))),
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn required_text(raw: &str, field: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn validate_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), AppError> {
    match (lat, lng) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng))
            if lat.is_finite() && lng.is_finite()
                && (-90.0..=90.0).contains(&lat)
                && (-180.0..=180.0).contains(&lng) => Ok(()),
        _ => Err(AppError::Validation("latitude and longitude must be given together and in range".into())),
    }
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation("Price must be zero or more".into()));
    }
    Ok(())
}

fn validate_capacity(max_attendees: Option<i32>) -> Result<(), AppError> {
    if let Some(max) = max_attendees
        && max <= 0
    {
        return Err(AppError::Validation("maxAttendees must be positive".into()));
    }
    Ok(())
}
