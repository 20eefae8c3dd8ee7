//! Configuration module
//!
//! Settings shared by every CLI command.

use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout for each request sent to a worker
    pub request_timeout: Duration,
}
