//! Challenge DTOs

use serde::{Deserialize, Serialize};

use crate::domain::nonce::Nonce;

/// Response of the challenge endpoint
///
/// Always well-formed: a worker that could not produce a nonce still
/// answers with `nonce: 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceMessage {
    pub nonce: Nonce,
}
