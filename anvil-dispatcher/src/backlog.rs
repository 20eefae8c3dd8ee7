//! Work backlog
//!
//! The backlog file lists the jobs to dispatch, in order, and the workers
//! to try when discovery is off:
//!
//! ```json
//! {
//!   "hosts": ["c001", "c002"],
//!   "work": [{ "dir": "/srv/build/alpha", "command": "make" }]
//! }
//! ```

use std::path::Path;

use anvil_core::domain::job::JobDescriptor;
use anvil_core::domain::worker::WorkerAddress;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Jobs to dispatch and the initial worker pool
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Backlog {
    #[serde(default)]
    pub hosts: Vec<WorkerAddress>,
    pub work: Vec<JobDescriptor>,
}

impl Backlog {
    /// Reads and validates a backlog file
    ///
    /// `hosts` may only be empty when discovery will fill the pool.
    pub fn load(path: impl AsRef<Path>, discovery_enabled: bool) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read backlog {}", path.display()))?;
        Self::parse(&text, discovery_enabled)
            .with_context(|| format!("Invalid backlog {}", path.display()))
    }

    pub fn parse(text: &str, discovery_enabled: bool) -> Result<Self> {
        let backlog: Backlog = serde_json::from_str(text).context("Malformed backlog JSON")?;
        backlog.validate(discovery_enabled)?;
        Ok(backlog)
    }

    fn validate(&self, discovery_enabled: bool) -> Result<()> {
        if self.work.is_empty() {
            anyhow::bail!("backlog contains no work");
        }

        if self.hosts.is_empty() && !discovery_enabled {
            anyhow::bail!("backlog lists no hosts and discovery is disabled");
        }

        if self.hosts.iter().any(|host| host.as_str().is_empty()) {
            anyhow::bail!("backlog contains an empty host");
        }

        for (index, job) in self.work.iter().enumerate() {
            if job.dir.is_empty() || job.command.is_empty() {
                anyhow::bail!("work item {} needs both a dir and a command", index);
            }
        }

        Ok(())
    }
}
