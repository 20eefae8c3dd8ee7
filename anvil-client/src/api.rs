//! Worker API abstraction
//!
//! The dispatch loop talks to workers through this trait so that it can be
//! driven by the HTTP client in production and by in-memory doubles in tests.

use anvil_core::domain::nonce::Nonce;
use anvil_core::domain::worker::WorkerAddress;
use anvil_core::dto::work::SubmitJob;
use async_trait::async_trait;

use crate::WorkerClient;
use crate::error::Result;

/// Operations the dispatcher needs from a worker
#[async_trait]
pub trait WorkerApi: Send + Sync {
    /// Advisory busy flag of `worker`
    async fn is_busy(&self, worker: &WorkerAddress) -> Result<bool>;

    /// Fresh challenge nonce from `worker`
    async fn challenge(&self, worker: &WorkerAddress) -> Result<Nonce>;

    /// Submit a signed job; `Ok` means the worker admitted it
    async fn submit(&self, worker: &WorkerAddress, request: &SubmitJob) -> Result<()>;
}

#[async_trait]
impl WorkerApi for WorkerClient {
    async fn is_busy(&self, worker: &WorkerAddress) -> Result<bool> {
        WorkerClient::is_busy(self, worker).await
    }

    async fn challenge(&self, worker: &WorkerAddress) -> Result<Nonce> {
        WorkerClient::challenge(self, worker).await
    }

    async fn submit(&self, worker: &WorkerAddress, request: &SubmitJob) -> Result<()> {
        WorkerClient::submit(self, worker, request).await
    }
}
