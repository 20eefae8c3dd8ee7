//! Worker API endpoints

use anvil_core::domain::nonce::Nonce;
use anvil_core::domain::worker::WorkerAddress;
use anvil_core::dto::challenge::NonceMessage;
use anvil_core::dto::status::BusyMessage;
use anvil_core::dto::work::SubmitJob;
use tracing::debug;

use crate::error::Result;
use crate::{CHALLENGE_PATH, STATUS_PATH, WORK_PATH, WorkerClient};

impl WorkerClient {
    /// Ask whether `worker` is currently running a job
    ///
    /// The answer is advisory; the worker may change state right after.
    pub async fn is_busy(&self, worker: &WorkerAddress) -> Result<bool> {
        let url = format!("{}{}", worker.base_url(), STATUS_PATH);
        let response = self.client.get(&url).send().await?;

        let message: BusyMessage = self.handle_response(response).await?;
        Ok(message.busy)
    }

    /// Request a fresh challenge nonce from `worker`
    ///
    /// A worker that failed to produce a nonce answers with a server error;
    /// a successful answer may still carry the `0` sentinel, which callers
    /// must treat as a failure.
    pub async fn challenge(&self, worker: &WorkerAddress) -> Result<Nonce> {
        let url = format!("{}{}", worker.base_url(), CHALLENGE_PATH);
        let response = self.client.get(&url).send().await?;

        let message: NonceMessage = self.handle_response(response).await?;
        Ok(message.nonce)
    }

    /// Submit a signed job to `worker`
    ///
    /// Returns once the worker has admitted the job; execution happens in
    /// the background on the worker.
    pub async fn submit(&self, worker: &WorkerAddress, request: &SubmitJob) -> Result<()> {
        let url = format!("{}{}", worker.base_url(), WORK_PATH);
        let response = self.client.post(&url).json(request).send().await?;

        let token = self.handle_token_response(response).await?;
        debug!("Worker {} answered submission with '{}'", worker, token);
        Ok(())
    }

    /// Lightweight liveness check used by discovery
    ///
    /// Any HTTP answer counts as alive, whatever its status code.
    pub async fn probe(&self, worker: &WorkerAddress) -> bool {
        let url = format!("{}{}", worker.base_url(), STATUS_PATH);
        self.client
            .head(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use anvil_core::domain::job::JobDescriptor;
    use anvil_core::signing::{self, SigningKey};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> WorkerAddress {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        WorkerAddress::new(address.to_string())
    }

    fn closed_address() -> WorkerAddress {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        WorkerAddress::new(address.to_string())
    }

    /// Worker whose submission endpoint always answers with `status` and `token`
    async fn answering(status: StatusCode, token: &'static str) -> WorkerAddress {
        serve(Router::new().route(WORK_PATH, post(move || async move { (status, token) }))).await
    }

    fn signed_job() -> SubmitJob {
        let key = SigningKey::from_bytes(&[0x42; 32]);
        let job = JobDescriptor::new("/srv/build/alpha", "make");
        let signature = signing::sign_job(&key, &job, 7).unwrap();
        SubmitJob::new(job, &signature)
    }

    #[tokio::test]
    async fn test_status_and_challenge() {
        let worker = serve(
            Router::new()
                .route(STATUS_PATH, get(|| async { Json(json!({ "busy": true })) }))
                .route(CHALLENGE_PATH, get(|| async { Json(json!({ "nonce": 99 })) })),
        )
        .await;
        let client = WorkerClient::new().unwrap();

        assert!(client.is_busy(&worker).await.unwrap());
        assert_eq!(client.challenge(&worker).await.unwrap(), 99);
    }

    #[tokio::test]
    async fn test_failed_challenge_is_a_server_error() {
        let worker = serve(Router::new().route(
            CHALLENGE_PATH,
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "nonce": 0 })),
                )
            }),
        ))
        .await;

        let err = WorkerClient::new()
            .unwrap()
            .challenge(&worker)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
        assert!(err.is_server_error());
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_accepted_submission() {
        let worker = serve(Router::new().route(
            WORK_PATH,
            post(|Json(request): Json<SubmitJob>| async move {
                if request.job.command == "make" && request.signature_r.len() == 64 {
                    (StatusCode::OK, "ok")
                } else {
                    (StatusCode::BAD_REQUEST, "error")
                }
            }),
        ))
        .await;

        let client = WorkerClient::new().unwrap();
        client.submit(&worker, &signed_job()).await.unwrap();
    }

    #[tokio::test]
    async fn test_busy_submission_is_a_conflict() {
        let worker = answering(StatusCode::PRECONDITION_FAILED, "busy").await;

        let err = WorkerClient::new()
            .unwrap()
            .submit(&worker, &signed_job())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(!err.is_signature_rejected());
    }

    #[tokio::test]
    async fn test_rejected_signature() {
        let worker = answering(StatusCode::BAD_REQUEST, "signature_error").await;

        let err = WorkerClient::new()
            .unwrap()
            .submit(&worker, &signed_job())
            .await
            .unwrap_err();
        assert!(err.is_signature_rejected());
        assert!(!err.is_conflict());
    }

    #[tokio::test]
    async fn test_malformed_submission_is_neither_conflict_nor_rejection() {
        let worker = answering(StatusCode::BAD_REQUEST, "error").await;

        let err = WorkerClient::new()
            .unwrap()
            .submit(&worker, &signed_job())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 400, .. }));
        assert!(!err.is_signature_rejected());
        assert!(!err.is_conflict());
    }

    #[tokio::test]
    async fn test_refused_connection_is_a_transport_failure() {
        let worker = closed_address();
        let client = WorkerClient::new().unwrap();

        assert!(client.is_busy(&worker).await.unwrap_err().is_transport());
        assert!(client.challenge(&worker).await.unwrap_err().is_transport());
        assert!(
            client
                .submit(&worker, &signed_job())
                .await
                .unwrap_err()
                .is_transport()
        );
        assert!(!client.probe(&worker).await);
    }
}
