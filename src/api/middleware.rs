use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::api::extractors::client_ip::ClientIp;
use crate::state::AppState;

pub const HEALTH_PATH: &str = "/api/health";

/// General per-IP limiter for `/api/*`. The health probe is never counted.
pub async fn api_rate_limit(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path == HEALTH_PATH || !path.starts_with("/api/") {
        return next.run(request).await;
    }

    let key = format!("api:{}", ip);
    let window = Duration::from_secs(state.config.api_rate_window_secs);

    let decision = match state.rate_limiter.check_and_record(&key, state.config.api_rate_limit, window).await {
        Ok(decision) => decision,
        Err(e) => {
            // fail open
            error!("Rate limiter unavailable: {:?}", e);
            return next.run(request).await;
        }
    };

    if !decision.allowed {
        warn!(ip = %ip, path = %path, "API rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests, please try again later" })),
        ).into_response();
        if let Ok(value) = HeaderValue::from_str(&decision.retry_after_secs.to_string()) {
            response.headers_mut().insert("Retry-After", value);
        }
        return response;
    }

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        response.headers_mut().insert("X-RateLimit-Remaining", value);
    }
    response
}
