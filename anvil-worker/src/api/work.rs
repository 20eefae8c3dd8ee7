//! Work API Handler

use std::sync::Arc;

use anvil_core::dto::work::{SubmitJob, TOKEN_OK};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::api::error::{ApiError, ApiResult};
use crate::service::WorkerService;

/// POST /api/work
/// Verifies a signed job and starts it if the worker is idle
pub async fn submit_work(
    State(service): State<Arc<WorkerService>>,
    payload: Result<Json<SubmitJob>, JsonRejection>,
) -> ApiResult<(StatusCode, &'static str)> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    tracing::debug!("Received submission for {}", request.job);

    let run_id = service.submit(request)?;
    tracing::info!("Accepted job [run {}]", run_id);

    Ok((StatusCode::OK, TOKEN_OK))
}
