//! Error types for the Anvil client

use thiserror::Error;

use anvil_core::dto::work::{TOKEN_BUSY, TOKEN_SIGNATURE_ERROR};

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a worker
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connection, timeout, ...)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Worker returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Body returned by the worker
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if the request never produced an HTTP response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_))
    }

    /// Check if the worker refused the job because it is already busy
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ApiError { status: 412, .. })
            || matches!(self, Self::ApiError { message, .. } if message == TOKEN_BUSY)
    }

    /// Check if the worker rejected the job signature
    pub fn is_signature_rejected(&self) -> bool {
        matches!(self, Self::ApiError { status: 400, message } if message == TOKEN_SIGNATURE_ERROR)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ClientError::api_error(412, "busy").is_conflict());
        assert!(ClientError::api_error(400, "signature_error").is_signature_rejected());
        assert!(!ClientError::api_error(400, "error").is_signature_rejected());
        assert!(ClientError::api_error(500, "error").is_server_error());
        assert!(!ClientError::ParseError("x".into()).is_transport());
    }
}
