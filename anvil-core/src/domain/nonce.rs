//! Challenge nonces
//!
//! A worker hands out one nonce per challenge request. The value `0` is
//! reserved: it is what a worker reports when it has no usable nonce, and
//! it is never a valid challenge.

/// A worker challenge value
pub type Nonce = u64;

/// Sentinel meaning "no nonce available"
pub const NONCE_UNAVAILABLE: Nonce = 0;

/// Returns true if `nonce` can be used as a challenge
pub fn is_valid(nonce: Nonce) -> bool {
    nonce != NONCE_UNAVAILABLE
}
