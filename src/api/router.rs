use axum::{
    body::Body,
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    auth, comment, event, favorite, friend, health, media, payment, rsvp, upload, user,
};
use crate::api::middleware::api_rate_limit;
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))

        // Auth
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/user", get(auth::current_user).put(user::update_profile))

        // Users
        .route("/api/users/{id}", get(user::get_user))
        .route("/api/users/{id}/events", get(user::list_user_events))

        // Events
        .route("/api/events/search", get(event::search_events))
        .route("/api/events", post(event::create_event))
        .route("/api/events/{id}", get(event::get_event).put(event::update_event).delete(event::delete_event))

        // RSVPs
        .route("/api/events/{id}/rsvp", post(rsvp::upsert_rsvp))
        .route("/api/events/{id}/rsvp/guest", post(rsvp::guest_rsvp))
        .route("/api/events/{id}/rsvps", get(rsvp::list_rsvps))

        // Comments & Media
        .route("/api/events/{id}/comments", get(comment::list_comments).post(comment::create_comment))
        .route("/api/events/{id}/comments/guest", post(comment::create_guest_comment))
        .route("/api/events/{id}/media", get(media::list_event_media))
        .route("/api/media", post(media::create_media))
        .route("/api/media/guest", post(media::create_guest_media))
        .route("/api/objects/upload", post(upload::request_upload_url))

        // Favorites
        .route("/api/favorites", get(favorite::list_favorites).post(favorite::add_favorite))
        .route("/api/favorites/{source}/{event_id}", axum::routing::delete(favorite::remove_favorite))

        // Friends
        .route("/api/friends", get(friend::list_friends))
        .route("/api/friends/requests", get(friend::list_requests))
        .route("/api/friends/{user_id}", post(friend::send_request).delete(friend::remove_friend))
        .route("/api/friends/{user_id}/accept", post(friend::accept_request))

        // Payments
        .route("/api/create-event-payment", post(payment::create_event_payment))

        .layer(middleware::from_fn_with_state(state.clone(), api_rate_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
