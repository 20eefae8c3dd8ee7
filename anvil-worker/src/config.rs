//! Worker configuration
//!
//! Settings for the worker process: where to listen, which key file to
//! trust, and how to run job commands.

use std::path::PathBuf;
use std::time::Duration;

use anvil_core::domain::worker::DEFAULT_WORKER_PORT;

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address to bind the HTTP API to
    pub bind_addr: String,

    /// Dispatcher key file; the verifying key is derived from it
    pub key_file: PathBuf,

    /// Shell used to run job commands (`<shell> -c <command>`)
    pub shell: String,

    /// Longest time one request may take, body upload included
    pub request_timeout: Duration,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - ANVIL_BIND_ADDR (default: 0.0.0.0:4753)
    /// - ANVIL_KEY_FILE (default: private.key)
    /// - ANVIL_SHELL (default: sh)
    /// - ANVIL_REQUEST_TIMEOUT (seconds, default: 5)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let request_timeout = match lookup("ANVIL_REQUEST_TIMEOUT") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| anyhow::anyhow!("ANVIL_REQUEST_TIMEOUT must be whole seconds: {}", e))?,
            None => defaults.request_timeout,
        };

        Ok(Self {
            bind_addr: lookup("ANVIL_BIND_ADDR").unwrap_or(defaults.bind_addr),
            key_file: lookup("ANVIL_KEY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.key_file),
            shell: lookup("ANVIL_SHELL").unwrap_or(defaults.shell),
            request_timeout,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.key_file.as_os_str().is_empty() {
            anyhow::bail!("key_file cannot be empty");
        }

        if self.shell.trim().is_empty() {
            anyhow::bail!("shell cannot be empty");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", DEFAULT_WORKER_PORT),
            key_file: PathBuf::from("private.key"),
            shell: "sh".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}
