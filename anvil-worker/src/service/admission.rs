//! Admission service
//!
//! Decides whether a submitted job may run on this worker. The signature is
//! checked before the busy gate is touched, so an unauthenticated caller can
//! never flip the worker to busy. Once admitted, the job runs in a detached
//! task that owns the duty of releasing the gate.
//!
//! The nonce is read once per submission and is not consumed: a captured
//! (job, signature) pair stays valid until the next challenge rotates it.

use std::sync::Arc;

use anvil_core::domain::job::JobDescriptor;
use anvil_core::domain::nonce::Nonce;
use anvil_core::dto::work::SubmitJob;
use anvil_core::signing::{self, JobSignature, VerifyingKey};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::service::busy::BusyGate;
use crate::service::execution::JobExecutor;
use crate::service::nonce::{NonceRegister, NonceUnavailable};

/// Reasons a submission is refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Signature components could not be decoded
    MalformedSignature(String),
    /// No challenge has been issued, or the last one failed
    NonceUnavailable,
    /// Signature does not match the job and current nonce
    Unauthorized,
    /// Another job is already running
    Busy,
}

impl From<NonceUnavailable> for AdmissionError {
    fn from(_: NonceUnavailable) -> Self {
        AdmissionError::NonceUnavailable
    }
}

/// Worker-side state shared by all request handlers
pub struct WorkerService {
    nonce: NonceRegister,
    gate: Arc<BusyGate>,
    verifying_key: VerifyingKey,
    executor: Arc<dyn JobExecutor>,
}

impl WorkerService {
    pub fn new(verifying_key: VerifyingKey, executor: Arc<dyn JobExecutor>) -> Self {
        Self::with_nonce_register(verifying_key, executor, NonceRegister::new())
    }

    pub fn with_nonce_register(
        verifying_key: VerifyingKey,
        executor: Arc<dyn JobExecutor>,
        nonce: NonceRegister,
    ) -> Self {
        Self {
            nonce,
            gate: Arc::new(BusyGate::new()),
            verifying_key,
            executor,
        }
    }

    /// Advisory busy flag
    pub fn is_busy(&self) -> bool {
        self.gate.peek()
    }

    /// Rotates the challenge nonce
    pub fn challenge(&self) -> Result<Nonce, NonceUnavailable> {
        let nonce = self.nonce.issue()?;
        debug!("Issued new challenge nonce");
        Ok(nonce)
    }

    /// Verifies and admits a job, then starts it in the background
    ///
    /// Returns the run id assigned to the admitted job.
    pub fn submit(&self, request: SubmitJob) -> Result<Uuid, AdmissionError> {
        let signature = JobSignature::from_components(&request.signature_r, &request.signature_s)
            .map_err(|e| AdmissionError::MalformedSignature(e.to_string()))?;

        let nonce = self.nonce.current()?;

        if !signing::verify_job(&self.verifying_key, &request.job, nonce, &signature) {
            return Err(AdmissionError::Unauthorized);
        }

        if !self.gate.try_acquire() {
            return Err(AdmissionError::Busy);
        }

        let run_id = Uuid::new_v4();
        self.launch(run_id, request.job);
        Ok(run_id)
    }

    /// Spawns the job; the spawned task releases the gate when it finishes
    fn launch(&self, run_id: Uuid, job: JobDescriptor) {
        let executor = Arc::clone(&self.executor);
        let gate = Arc::clone(&self.gate);

        tokio::spawn(async move {
            info!("Executing job {} [run {}]", job, run_id);

            let execution = {
                let job = job.clone();
                tokio::spawn(async move { executor.execute(&job).await })
            };
            let outcome = execution.await;

            if !gate.release() {
                error!(
                    "Busy gate was already idle when run {} finished; single-job invariant violated",
                    run_id
                );
                return;
            }

            match outcome {
                Ok(Ok(result)) if result.success => {
                    info!("Job {} completed successfully [run {}]", job, run_id);
                }
                Ok(Ok(result)) => {
                    warn!(
                        "Job {} failed [run {}]: {}",
                        job,
                        run_id,
                        result.error_message.unwrap_or_default()
                    );
                }
                Ok(Err(e)) => error!("Job {} could not run [run {}]: {:#}", job, run_id, e),
                Err(e) => error!("Job {} task aborted [run {}]: {}", job, run_id, e),
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn gate(&self) -> &BusyGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{
        BlockingExecutor, PanickingExecutor, RecordingExecutor, dispatcher_key, signed_request,
        wait_until_idle,
    };
    use anvil_core::signing::SigningKey;

    fn service_with(executor: Arc<dyn JobExecutor>) -> WorkerService {
        WorkerService::new(dispatcher_key().verifying_key(), executor)
    }

    #[tokio::test]
    async fn test_signed_job_is_admitted_and_executed() {
        let (executor, mut executed) = RecordingExecutor::new();
        let service = service_with(executor);
        let job = JobDescriptor::new("/srv/build/alpha", "make");

        let nonce = service.challenge().unwrap();
        service
            .submit(signed_request(&dispatcher_key(), &job, nonce))
            .unwrap();

        assert_eq!(executed.recv().await.unwrap(), job);
        wait_until_idle(&service).await;
    }

    #[tokio::test]
    async fn test_wrong_key_leaves_gate_idle() {
        let (executor, _executed) = RecordingExecutor::new();
        let service = service_with(executor);
        let job = JobDescriptor::new("/srv/build/alpha", "make");
        let intruder = SigningKey::from_bytes(&[0x99; 32]);

        let nonce = service.challenge().unwrap();
        let result = service.submit(signed_request(&intruder, &job, nonce));

        assert_eq!(result, Err(AdmissionError::Unauthorized));
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn test_replay_after_rotation_is_rejected() {
        let (executor, _executed) = RecordingExecutor::new();
        let service = service_with(executor);
        let job = JobDescriptor::new("/srv/build/alpha", "make");

        let nonce = service.challenge().unwrap();
        let request = signed_request(&dispatcher_key(), &job, nonce);
        service.challenge().unwrap();

        assert_eq!(service.submit(request), Err(AdmissionError::Unauthorized));
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn test_submission_without_challenge() {
        let (executor, _executed) = RecordingExecutor::new();
        let service = service_with(executor);
        let job = JobDescriptor::new("/srv/build/alpha", "make");

        let result = service.submit(signed_request(&dispatcher_key(), &job, 1));
        assert_eq!(result, Err(AdmissionError::NonceUnavailable));
    }

    #[tokio::test]
    async fn test_malformed_signature() {
        let (executor, _executed) = RecordingExecutor::new();
        let service = service_with(executor);
        service.challenge().unwrap();

        let request = SubmitJob {
            job: JobDescriptor::new("/srv/build/alpha", "make"),
            signature_r: "not-a-number".to_string(),
            signature_s: "00".repeat(32),
        };

        assert!(matches!(
            service.submit(request),
            Err(AdmissionError::MalformedSignature(_))
        ));
        assert!(!service.is_busy());
    }

    #[tokio::test]
    async fn test_second_job_is_refused_while_busy() {
        let (executor, finish) = BlockingExecutor::new();
        let service = service_with(executor);
        let job = JobDescriptor::new("/srv/build/alpha", "make");

        let nonce = service.challenge().unwrap();
        let request = signed_request(&dispatcher_key(), &job, nonce);

        service.submit(request.clone()).unwrap();
        assert!(service.is_busy());
        assert_eq!(service.submit(request.clone()), Err(AdmissionError::Busy));

        finish.notify_one();
        wait_until_idle(&service).await;

        // Same nonce, same signature: admitted again once idle
        service.submit(request).unwrap();
        finish.notify_one();
        wait_until_idle(&service).await;
    }

    #[tokio::test]
    async fn test_panicking_job_still_releases_gate() {
        let service = service_with(Arc::new(PanickingExecutor));
        let job = JobDescriptor::new("/srv/build/alpha", "make");

        let nonce = service.challenge().unwrap();
        service
            .submit(signed_request(&dispatcher_key(), &job, nonce))
            .unwrap();

        wait_until_idle(&service).await;
    }

    #[tokio::test]
    async fn test_double_release_is_survived() {
        let (executor, finish) = BlockingExecutor::new();
        let service = service_with(executor);
        let job = JobDescriptor::new("/srv/build/alpha", "make");

        let nonce = service.challenge().unwrap();
        service
            .submit(signed_request(&dispatcher_key(), &job, nonce))
            .unwrap();

        assert!(service.gate().release());
        finish.notify_one();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(!service.is_busy());
        let nonce = service.challenge().unwrap();
        service
            .submit(signed_request(&dispatcher_key(), &job, nonce))
            .unwrap();
    }
}
