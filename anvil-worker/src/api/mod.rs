//! API Module
//!
//! HTTP API layer for the worker.
//! Each submodule handles one endpoint of the dispatch protocol.

pub mod challenge;
pub mod error;
pub mod status;
pub mod work;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::service::WorkerService;

/// Create the worker router with all endpoints
///
/// A request that is not answered within `request_timeout`, including a
/// client that stalls while uploading its body, gets 408 Request Timeout.
pub fn create_router(service: Arc<WorkerService>, request_timeout: Duration) -> Router {
    Router::new()
        // Advisory status; also answers HEAD for discovery probes
        .route("/api/is_busy", get(status::is_busy))
        .route("/api/get_nonce", get(challenge::get_nonce))
        .route("/api/work", post(work::submit_work))
        .with_state(service)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
