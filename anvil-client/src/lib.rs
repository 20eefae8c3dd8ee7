//! Anvil HTTP Client
//!
//! A small, type-safe HTTP client for talking to Anvil workers.
//!
//! The dispatcher and the CLI both use it to query worker status, request
//! challenges, submit signed jobs and probe candidate hosts.
//!
//! # Example
//!
//! ```no_run
//! use anvil_client::WorkerClient;
//! use anvil_core::domain::worker::WorkerAddress;
//!
//! #[tokio::main]
//! async fn main() -> anvil_client::Result<()> {
//!     let client = WorkerClient::new()?;
//!     let busy = client.is_busy(&WorkerAddress::new("c001")).await?;
//!     println!("busy: {}", busy);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod discovery;
pub mod error;
mod worker;

// Re-export commonly used types
pub use api::WorkerApi;
pub use discovery::{HostRange, discover};
pub use error::{ClientError, Result};

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// Timeout applied to every worker request unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout applied to discovery probes unless configured otherwise
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) const STATUS_PATH: &str = "/api/is_busy";
pub(crate) const CHALLENGE_PATH: &str = "/api/get_nonce";
pub(crate) const WORK_PATH: &str = "/api/work";

/// HTTP client for the worker API
///
/// One client serves the whole worker pool; every call names the worker
/// it talks to.
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// HTTP client instance
    client: Client,
    /// Timeout for liveness probes
    probe_timeout: Duration,
}

impl WorkerClient {
    /// Create a client with the default request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    /// Create a client around a preconfigured reqwest Client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Override the liveness probe timeout
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Timeout used by [`WorkerClient::probe`]
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response whose body is only a status token
    async fn handle_token_response(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if !status.is_success() {
            return Err(ClientError::api_error(status.as_u16(), text.trim()));
        }

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WorkerClient::new().unwrap();
        assert_eq!(client.probe_timeout(), DEFAULT_PROBE_TIMEOUT);
    }

    #[test]
    fn test_client_with_probe_timeout() {
        let client = WorkerClient::with_client(Client::new())
            .with_probe_timeout(Duration::from_millis(250));
        assert_eq!(client.probe_timeout(), Duration::from_millis(250));
    }
}
