//! Worker pool source
//!
//! Supplies a fresh worker pool to the dispatch loop. The standard
//! implementation runs host discovery over a configured candidate range.

use anvil_client::{HostRange, WorkerClient, discover};
use anvil_core::domain::worker::WorkerAddress;
use async_trait::async_trait;
use tracing::info;

/// Service trait for refreshing the worker pool
#[async_trait]
pub trait WorkerPoolSource: Send + Sync {
    /// Returns the current set of usable workers, sorted
    async fn discover(&self) -> Vec<WorkerAddress>;
}

/// Discovers workers by probing a numbered host range
pub struct HostRangeDiscovery {
    client: WorkerClient,
    hosts: HostRange,
}

impl HostRangeDiscovery {
    /// Creates a discovery service; `client` carries the probe timeout
    pub fn new(client: WorkerClient, hosts: HostRange) -> Self {
        Self { client, hosts }
    }
}

#[async_trait]
impl WorkerPoolSource for HostRangeDiscovery {
    async fn discover(&self) -> Vec<WorkerAddress> {
        let hosts = discover(&self.client, self.hosts.candidates()).await;

        let names: Vec<&str> = hosts.iter().map(WorkerAddress::as_str).collect();
        info!("Found hosts: [{}]", names.join(", "));

        hosts
    }
}
