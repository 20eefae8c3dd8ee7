//! Challenge API Handler

use std::sync::Arc;

use anvil_core::domain::nonce::NONCE_UNAVAILABLE;
use anvil_core::dto::challenge::NonceMessage;
use axum::{Json, extract::State, http::StatusCode};

use crate::service::WorkerService;

/// GET /api/get_nonce
/// Rotates the challenge nonce and returns the new value
///
/// On failure the body still carries a nonce, the `0` sentinel, next to a
/// server error status.
pub async fn get_nonce(
    State(service): State<Arc<WorkerService>>,
) -> (StatusCode, Json<NonceMessage>) {
    match service.challenge() {
        Ok(nonce) => (StatusCode::OK, Json(NonceMessage { nonce })),
        Err(_) => {
            tracing::error!("Error resetting nonce: no usable nonce drawn");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(NonceMessage {
                    nonce: NONCE_UNAVAILABLE,
                }),
            )
        }
    }
}
