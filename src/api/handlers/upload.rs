use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;

pub async fn request_upload_url(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.object_storage.signed_upload_url().await?;
    Ok(Json(target))
}
