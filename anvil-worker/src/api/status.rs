//! Status API Handler

use std::sync::Arc;

use anvil_core::dto::status::BusyMessage;
use axum::{Json, extract::State};

use crate::service::WorkerService;

/// GET /api/is_busy
/// Reports whether a job is currently running
pub async fn is_busy(State(service): State<Arc<WorkerService>>) -> Json<BusyMessage> {
    Json(BusyMessage {
        busy: service.is_busy(),
    })
}
