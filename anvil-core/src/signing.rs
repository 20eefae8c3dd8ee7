//! Job signing
//!
//! The dispatcher proves that it authored a job by signing a canonical
//! encoding of the job bound to the worker's current nonce. Workers rebuild
//! the same bytes and verify them with the dispatcher's public key.
//!
//! Canonical message (protocol v2): every field is written as an 8-byte
//! big-endian length followed by its raw bytes, in this order:
//!
//! 1. the protocol tag `anvil/job/v2`
//! 2. the job directory
//! 3. the job command
//! 4. the nonce as lowercase hexadecimal
//!
//! The SHA-256 digest of that message is signed with Ed25519. On the wire a
//! signature travels as its two 32-byte halves (R and S), each hex encoded.

use ed25519_dalek::{Signature, Signer};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::job::JobDescriptor;
use crate::domain::nonce::Nonce;

pub use ed25519_dalek::{SigningKey, VerifyingKey};

/// Protocol tag leading every canonical message
pub const MESSAGE_TAG: &[u8] = b"anvil/job/v2";

const COMPONENT_LEN: usize = 32;

/// Errors produced while signing or decoding signatures
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The key could not produce a signature
    #[error("signing failed: {0}")]
    Signing(String),

    /// A signature component is not a valid encoding
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

/// A signature over a canonical job message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSignature(Signature);

impl JobSignature {
    /// Wire form: `(signature_r, signature_s)` as lowercase hex
    pub fn to_components(&self) -> (String, String) {
        (hex::encode(self.0.r_bytes()), hex::encode(self.0.s_bytes()))
    }

    /// Parses the two wire components back into a signature
    pub fn from_components(r: &str, s: &str) -> Result<Self, SignatureError> {
        let r = decode_component("signature_r", r)?;
        let s = decode_component("signature_s", s)?;
        Ok(Self(Signature::from_components(r, s)))
    }
}

fn decode_component(name: &str, value: &str) -> Result<[u8; COMPONENT_LEN], SignatureError> {
    let bytes = hex::decode(value.trim())
        .map_err(|e| SignatureError::MalformedSignature(format!("{}: {}", name, e)))?;

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        SignatureError::MalformedSignature(format!(
            "{}: expected {} bytes, got {}",
            name,
            COMPONENT_LEN,
            bytes.len()
        ))
    })
}

/// Builds the exact byte sequence that is hashed and signed for `job`
pub fn canonical_message(job: &JobDescriptor, nonce: Nonce) -> Vec<u8> {
    let nonce_hex = format!("{:x}", nonce);
    let fields: [&[u8]; 4] = [
        MESSAGE_TAG,
        job.dir.as_bytes(),
        job.command.as_bytes(),
        nonce_hex.as_bytes(),
    ];

    let capacity = fields.iter().map(|field| 8 + field.len()).sum();
    let mut message = Vec::with_capacity(capacity);
    for field in fields {
        message.extend_from_slice(&(field.len() as u64).to_be_bytes());
        message.extend_from_slice(field);
    }
    message
}

/// Signs the SHA-256 digest of `message`
pub fn sign(key: &SigningKey, message: &[u8]) -> Result<JobSignature, SignatureError> {
    let digest = Sha256::digest(message);
    key.try_sign(digest.as_slice())
        .map(JobSignature)
        .map_err(|e| SignatureError::Signing(e.to_string()))
}

/// Verifies `signature` over the SHA-256 digest of `message`
///
/// A signature that does not match is not an error: it yields `false`.
pub fn verify(key: &VerifyingKey, message: &[u8], signature: &JobSignature) -> bool {
    let digest = Sha256::digest(message);
    key.verify_strict(digest.as_slice(), &signature.0).is_ok()
}

/// Signs `job` against `nonce` in one step
pub fn sign_job(
    key: &SigningKey,
    job: &JobDescriptor,
    nonce: Nonce,
) -> Result<JobSignature, SignatureError> {
    sign(key, &canonical_message(job, nonce))
}

/// Verifies a signature received for `job` against `nonce`
pub fn verify_job(
    key: &VerifyingKey,
    job: &JobDescriptor,
    nonce: Nonce,
    signature: &JobSignature,
) -> bool {
    verify(key, &canonical_message(job, nonce), signature)
}
