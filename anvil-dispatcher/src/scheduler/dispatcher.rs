//! Dispatch loop
//!
//! For every job, scan the worker pool in order: ask for status, skip busy
//! workers, fetch a challenge nonce, sign the job against it and submit.
//! The first worker that accepts ends the scan. A pass with no acceptance
//! sleeps for the retry backoff and starts over; a job is never dropped.
//!
//! Per-worker failures only skip that worker. Nothing aborts the backlog.

use std::sync::Arc;
use std::time::Duration;

use anvil_client::{ClientError, WorkerApi};
use anvil_core::domain::job::JobDescriptor;
use anvil_core::domain::nonce;
use anvil_core::domain::worker::WorkerAddress;
use anvil_core::dto::work::SubmitJob;
use anvil_core::signing::{self, SignatureError, SigningKey};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use crate::service::WorkerPoolSource;

/// One job and the worker that accepted it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub job: JobDescriptor,
    pub worker: WorkerAddress,
    /// Scan passes needed, counting the successful one
    pub passes: u32,
}

/// Outcome of a full backlog run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub assignments: Vec<Assignment>,
}

/// Why one worker did not take the job
#[derive(Debug)]
enum OfferError {
    /// Status reported busy
    Busy,
    /// Worker answered 412 to the submission
    Conflict,
    /// Worker rejected the signature
    Unauthorized,
    /// No HTTP answer at all
    Transport(ClientError),
    /// Worker answered with something unusable
    Protocol(String),
    /// Job could not be signed
    Signing(SignatureError),
}

impl OfferError {
    fn from_client(err: ClientError) -> Self {
        if err.is_transport() {
            OfferError::Transport(err)
        } else if err.is_conflict() {
            OfferError::Conflict
        } else if err.is_signature_rejected() {
            OfferError::Unauthorized
        } else {
            OfferError::Protocol(err.to_string())
        }
    }

    fn log(&self, worker: &WorkerAddress) {
        match self {
            OfferError::Busy => debug!("Worker {} is busy", worker),
            OfferError::Conflict => debug!("Worker {} became busy before admitting the job", worker),
            OfferError::Unauthorized => {
                warn!("Worker {} rejected the job signature", worker)
            }
            OfferError::Transport(e) => warn!("Worker {} unreachable: {}", worker, e),
            OfferError::Protocol(msg) => error!("Worker {} protocol error: {}", worker, msg),
            OfferError::Signing(e) => error!("Failed to sign job for {}: {}", worker, e),
        }
    }
}

/// Coordinator-side dispatch loop
pub struct Dispatcher {
    client: Arc<dyn WorkerApi>,
    signing_key: SigningKey,
    pool: Vec<WorkerAddress>,
    pool_source: Option<Arc<dyn WorkerPoolSource>>,
    refresh_interval: Duration,
    last_refresh: Option<Instant>,
    retry_backoff: Duration,
}

impl Dispatcher {
    /// Creates a dispatcher over a fixed initial worker pool
    pub fn new(
        client: Arc<dyn WorkerApi>,
        signing_key: SigningKey,
        pool: Vec<WorkerAddress>,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            client,
            signing_key,
            pool,
            pool_source: None,
            refresh_interval: Duration::MAX,
            last_refresh: None,
            retry_backoff,
        }
    }

    /// Replaces the pool from `source` whenever it is empty or older than
    /// `refresh_interval`
    pub fn with_pool_source(
        mut self,
        source: Arc<dyn WorkerPoolSource>,
        refresh_interval: Duration,
    ) -> Self {
        self.pool_source = Some(source);
        self.refresh_interval = refresh_interval;
        self
    }

    /// Current worker pool
    pub fn pool(&self) -> &[WorkerAddress] {
        &self.pool
    }

    /// Dispatches every job in order; returns once all are accepted
    pub async fn run(&mut self, backlog: Vec<JobDescriptor>) -> DispatchReport {
        let total = backlog.len();
        let mut report = DispatchReport::default();

        for (index, job) in backlog.into_iter().enumerate() {
            info!("Next to send ({}/{}): {}", index + 1, total, job);

            let (worker, passes) = self.dispatch(&job).await;
            info!("Host {} accepted {}", worker, job);

            report.assignments.push(Assignment {
                job,
                worker,
                passes,
            });
        }

        report
    }

    /// Scans the pool until a worker accepts `job`
    ///
    /// Returns the accepting worker and the number of passes it took.
    pub async fn dispatch(&mut self, job: &JobDescriptor) -> (WorkerAddress, u32) {
        let mut passes = 0;

        loop {
            passes += 1;
            self.refresh_pool_if_stale().await;

            for worker in self.pool.clone() {
                match self.offer(&worker, job).await {
                    Ok(()) => return (worker, passes),
                    Err(e) => e.log(&worker),
                }
            }

            if self.pool.is_empty() {
                warn!("Worker pool is empty");
            }

            debug!(
                "No worker accepted {} on pass {}, retrying in {:?}",
                job, passes, self.retry_backoff
            );
            time::sleep(self.retry_backoff).await;
        }
    }

    async fn refresh_pool_if_stale(&mut self) {
        let Some(source) = &self.pool_source else {
            return;
        };

        let stale = self
            .last_refresh
            .is_none_or(|at| at.elapsed() >= self.refresh_interval);

        if self.pool.is_empty() || stale {
            self.pool = source.discover().await;
            self.last_refresh = Some(Instant::now());
        }
    }

    /// Runs the admission protocol against one worker
    async fn offer(&self, worker: &WorkerAddress, job: &JobDescriptor) -> Result<(), OfferError> {
        let busy = self
            .client
            .is_busy(worker)
            .await
            .map_err(OfferError::from_client)?;
        if busy {
            return Err(OfferError::Busy);
        }

        let nonce = self
            .client
            .challenge(worker)
            .await
            .map_err(OfferError::from_client)?;
        if !nonce::is_valid(nonce) {
            return Err(OfferError::Protocol("worker returned nonce 0".to_string()));
        }

        let signature =
            signing::sign_job(&self.signing_key, job, nonce).map_err(OfferError::Signing)?;
        let request = SubmitJob::new(job.clone(), &signature);

        self.client
            .submit(worker, &request)
            .await
            .map_err(OfferError::from_client)
    }
}
