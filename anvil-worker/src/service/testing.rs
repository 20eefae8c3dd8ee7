//! Test doubles for the worker services

use std::sync::Arc;
use std::time::Duration;

use anvil_core::domain::job::{JobDescriptor, JobResult};
use anvil_core::domain::nonce::Nonce;
use anvil_core::dto::work::SubmitJob;
use anvil_core::signing::{self, SigningKey};
use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use crate::service::admission::WorkerService;
use crate::service::execution::JobExecutor;

pub(crate) fn dispatcher_key() -> SigningKey {
    SigningKey::from_bytes(&[0x42; 32])
}

pub(crate) fn signed_request(key: &SigningKey, job: &JobDescriptor, nonce: Nonce) -> SubmitJob {
    let signature = signing::sign_job(key, job, nonce).unwrap();
    SubmitJob::new(job.clone(), &signature)
}

pub(crate) async fn wait_until_idle(service: &WorkerService) {
    for _ in 0..200 {
        if !service.is_busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("worker never became idle");
}

/// Reports every executed job on a channel and succeeds immediately
pub(crate) struct RecordingExecutor {
    executed: mpsc::UnboundedSender<JobDescriptor>,
}

impl RecordingExecutor {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<JobDescriptor>) {
        let (executed, receiver) = mpsc::unbounded_channel();
        (Arc::new(Self { executed }), receiver)
    }
}

#[async_trait]
impl JobExecutor for RecordingExecutor {
    async fn execute(&self, job: &JobDescriptor) -> anyhow::Result<JobResult> {
        let _ = self.executed.send(job.clone());
        Ok(JobResult::succeeded())
    }
}

/// Runs until notified
pub(crate) struct BlockingExecutor {
    finish: Arc<Notify>,
}

impl BlockingExecutor {
    pub(crate) fn new() -> (Arc<Self>, Arc<Notify>) {
        let finish = Arc::new(Notify::new());
        (
            Arc::new(Self {
                finish: Arc::clone(&finish),
            }),
            finish,
        )
    }
}

#[async_trait]
impl JobExecutor for BlockingExecutor {
    async fn execute(&self, _job: &JobDescriptor) -> anyhow::Result<JobResult> {
        self.finish.notified().await;
        Ok(JobResult::succeeded())
    }
}

pub(crate) struct PanickingExecutor;

#[async_trait]
impl JobExecutor for PanickingExecutor {
    async fn execute(&self, _job: &JobDescriptor) -> anyhow::Result<JobResult> {
        panic!("job blew up");
    }
}
