//! Worker addressing
//!
//! Workers are identified by a host name or `host:port` string. Addresses
//! without a port use the fixed worker port. IPv6 literals may be given
//! bare (`::1`) or bracketed (`[::1]:9000`); only the bracketed form can
//! carry a port.

use serde::{Deserialize, Serialize};

/// Port every worker listens on unless told otherwise
pub const DEFAULT_WORKER_PORT: u16 = 4753;

/// Network location of a worker
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct WorkerAddress(String);

impl WorkerAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base URL for the worker's HTTP API, without a trailing slash
    pub fn base_url(&self) -> String {
        let address = self.0.trim_end_matches('/');

        if address.starts_with("http://") || address.starts_with("https://") {
            return address.to_string();
        }

        if address.starts_with('[') {
            return match address.rsplit_once("]:") {
                Some((_, port)) if port.parse::<u16>().is_ok() => format!("http://{}", address),
                _ => format!("http://{}:{}", address, DEFAULT_WORKER_PORT),
            };
        }

        // More than one colon can only be an unbracketed IPv6 literal
        if address.matches(':').count() > 1 {
            return format!("http://[{}]:{}", address, DEFAULT_WORKER_PORT);
        }

        let has_port = address
            .rsplit_once(':')
            .is_some_and(|(_, port)| port.parse::<u16>().is_ok());

        if has_port {
            format!("http://{}", address)
        } else {
            format!("http://{}:{}", address, DEFAULT_WORKER_PORT)
        }
    }
}

impl std::fmt::Display for WorkerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WorkerAddress {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<WorkerAddress> for String {
    fn from(value: WorkerAddress) -> Self {
        value.0
    }
}
