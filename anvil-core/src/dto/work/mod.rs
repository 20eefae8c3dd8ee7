//! Work submission DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobDescriptor;
use crate::signing::JobSignature;

/// Response token for an accepted submission
pub const TOKEN_OK: &str = "ok";
/// Response token for a malformed request or an internal failure
pub const TOKEN_ERROR: &str = "error";
/// Response token for a signature that did not verify
pub const TOKEN_SIGNATURE_ERROR: &str = "signature_error";
/// Response token for a worker that is already running a job
pub const TOKEN_BUSY: &str = "busy";

/// Request body of the submission endpoint
///
/// The job fields sit at the top level next to the two signature halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitJob {
    #[serde(flatten)]
    pub job: JobDescriptor,
    pub signature_r: String,
    pub signature_s: String,
}

impl SubmitJob {
    pub fn new(job: JobDescriptor, signature: &JobSignature) -> Self {
        let (signature_r, signature_s) = signature.to_components();
        Self {
            job,
            signature_r,
            signature_s,
        }
    }
}
