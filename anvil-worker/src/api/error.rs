//! API Error Handling
//!
//! Maps service failures to status codes and plain-text status tokens.

use anvil_core::dto::work::{TOKEN_BUSY, TOKEN_ERROR, TOKEN_SIGNATURE_ERROR};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::AdmissionError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Busy,
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, token) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Rejected malformed submission: {}", msg);
                (StatusCode::BAD_REQUEST, TOKEN_ERROR)
            }
            ApiError::Unauthorized => {
                tracing::warn!("Rejected submission: signature verification failed");
                (StatusCode::BAD_REQUEST, TOKEN_SIGNATURE_ERROR)
            }
            ApiError::Busy => {
                tracing::debug!("Rejected submission: worker is busy");
                (StatusCode::PRECONDITION_FAILED, TOKEN_BUSY)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, TOKEN_ERROR)
            }
        };

        (status, token).into_response()
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::MalformedSignature(msg) => ApiError::BadRequest(msg),
            AdmissionError::NonceUnavailable => {
                ApiError::InternalError("no challenge nonce available".to_string())
            }
            AdmissionError::Unauthorized => ApiError::Unauthorized,
            AdmissionError::Busy => ApiError::Busy,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
