//! Dispatcher configuration
//!
//! Defines the key and backlog locations, network timeouts, the retry
//! backoff of the dispatch loop, and optional host discovery.

use std::path::PathBuf;
use std::time::Duration;

use anvil_client::HostRange;
use anvil_client::discovery::parse_index_range;
use anvil_core::domain::worker::DEFAULT_WORKER_PORT;

/// Host discovery settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Candidate host naming convention
    pub hosts: HostRange,

    /// How long a single liveness probe may take
    pub probe_timeout: Duration,

    /// How long a discovered pool is trusted before it is refreshed
    pub refresh_interval: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            hosts: HostRange::default(),
            probe_timeout: Duration::from_secs(5),
            refresh_interval: Duration::from_secs(300),
        }
    }
}

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Private key used to sign jobs
    pub key_file: PathBuf,

    /// JSON backlog with the job list and the initial hosts
    pub backlog_file: PathBuf,

    /// Timeout for every request to a worker
    pub request_timeout: Duration,

    /// Pause after a scan pass in which no worker accepted the job
    pub retry_backoff: Duration,

    /// Host discovery, when enabled
    pub discovery: Option<DiscoveryConfig>,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - ANVIL_KEY_FILE (default: private.key)
    /// - ANVIL_BACKLOG (default: work.json)
    /// - ANVIL_REQUEST_TIMEOUT (seconds, default: 5)
    /// - ANVIL_RETRY_BACKOFF (seconds, default: 10)
    /// - ANVIL_DISCOVERY (1/true to enable, default: off)
    /// - ANVIL_DISCOVERY_PREFIX (default: c)
    /// - ANVIL_DISCOVERY_WIDTH (default: 3)
    /// - ANVIL_DISCOVERY_RANGE (first-last, default: 1-64)
    /// - ANVIL_DISCOVERY_PORT (default: 4753)
    /// - ANVIL_DISCOVERY_REFRESH (seconds, default: 300)
    /// - ANVIL_PROBE_TIMEOUT (seconds, default: 5)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let seconds = |name: &str, default: Duration| -> anyhow::Result<Duration> {
            match lookup(name) {
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| anyhow::anyhow!("{} must be a number of seconds: {}", name, e)),
                None => Ok(default),
            }
        };

        let discovery_enabled = lookup("ANVIL_DISCOVERY")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let discovery = if discovery_enabled {
            let base = DiscoveryConfig::default();

            let prefix = lookup("ANVIL_DISCOVERY_PREFIX").unwrap_or(base.hosts.prefix.clone());
            let width = match lookup("ANVIL_DISCOVERY_WIDTH") {
                Some(value) => value
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| anyhow::anyhow!("ANVIL_DISCOVERY_WIDTH is invalid: {}", e))?,
                None => base.hosts.width,
            };
            let indices = match lookup("ANVIL_DISCOVERY_RANGE") {
                Some(value) => parse_index_range(&value)
                    .map_err(|e| anyhow::anyhow!("ANVIL_DISCOVERY_RANGE is invalid: {}", e))?,
                None => base.hosts.indices.clone(),
            };
            let port = match lookup("ANVIL_DISCOVERY_PORT") {
                Some(value) => value
                    .trim()
                    .parse::<u16>()
                    .map_err(|e| anyhow::anyhow!("ANVIL_DISCOVERY_PORT is invalid: {}", e))?,
                None => DEFAULT_WORKER_PORT,
            };

            Some(DiscoveryConfig {
                hosts: HostRange::new(prefix, width, indices).with_port(port),
                probe_timeout: seconds("ANVIL_PROBE_TIMEOUT", base.probe_timeout)?,
                refresh_interval: seconds("ANVIL_DISCOVERY_REFRESH", base.refresh_interval)?,
            })
        } else {
            None
        };

        Ok(Self {
            key_file: lookup("ANVIL_KEY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_file),
            backlog_file: lookup("ANVIL_BACKLOG")
                .map(PathBuf::from)
                .unwrap_or(defaults.backlog_file),
            request_timeout: seconds("ANVIL_REQUEST_TIMEOUT", defaults.request_timeout)?,
            retry_backoff: seconds("ANVIL_RETRY_BACKOFF", defaults.retry_backoff)?,
            discovery,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.retry_backoff.is_zero() {
            anyhow::bail!("retry_backoff must be greater than 0");
        }

        if let Some(discovery) = &self.discovery {
            if discovery.probe_timeout.is_zero() {
                anyhow::bail!("probe_timeout must be greater than 0");
            }

            if discovery.hosts.prefix.is_empty() {
                anyhow::bail!("discovery prefix cannot be empty");
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from("private.key"),
            backlog_file: PathBuf::from("work.json"),
            request_timeout: Duration::from_secs(5),
            retry_backoff: Duration::from_secs(10),
            discovery: None,
        }
    }
}
