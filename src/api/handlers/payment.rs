use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::PaymentResponse;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Starts a payment for the fixed platform fee charged to event hosts.
pub async fn create_event_payment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let intent = state.payment_service.create_platform_fee_intent(&user.id).await?;

    info!(intent_id = %intent.id, amount = intent.amount, "Platform fee intent created");

    Ok(Json(PaymentResponse {
        client_secret: intent.client_secret,
        amount: intent.amount,
        currency: intent.currency,
    }))
}
