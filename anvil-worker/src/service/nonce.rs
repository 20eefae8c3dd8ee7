//! Nonce register
//!
//! Single-slot challenge value for this worker. Every challenge request
//! replaces the stored nonce with a fresh random one; submissions read it
//! back to rebuild the signed message. The previous value is gone for good.

use std::sync::atomic::{AtomicU64, Ordering};

use anvil_core::domain::nonce::{NONCE_UNAVAILABLE, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::warn;

/// The register holds no usable nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceUnavailable;

/// Source of random nonce candidates
pub trait NonceSource: Send + Sync {
    fn next_nonce(&self) -> Result<Nonce, String>;
}

/// Nonces drawn from the operating system CSPRNG
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn next_nonce(&self) -> Result<Nonce, String> {
        let mut bytes = [0u8; 8];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| e.to_string())?;
        Ok(u64::from_le_bytes(bytes))
    }
}

/// Concurrency-safe single-slot nonce storage
pub struct NonceRegister {
    value: AtomicU64,
    source: Box<dyn NonceSource>,
}

impl NonceRegister {
    /// Creates an empty register backed by the OS random source
    pub fn new() -> Self {
        Self::with_source(OsNonceSource)
    }

    pub fn with_source(source: impl NonceSource + 'static) -> Self {
        Self {
            value: AtomicU64::new(NONCE_UNAVAILABLE),
            source: Box::new(source),
        }
    }

    /// Replaces the stored nonce with a fresh one and returns it
    ///
    /// No retry: a failed draw or a drawn `0` empties the register.
    pub fn issue(&self) -> Result<Nonce, NonceUnavailable> {
        match self.source.next_nonce() {
            Ok(NONCE_UNAVAILABLE) => {
                warn!("Random source produced the reserved nonce 0");
                self.value.store(NONCE_UNAVAILABLE, Ordering::SeqCst);
                Err(NonceUnavailable)
            }
            Ok(nonce) => {
                self.value.store(nonce, Ordering::SeqCst);
                Ok(nonce)
            }
            Err(e) => {
                warn!("Failed to draw a nonce: {}", e);
                self.value.store(NONCE_UNAVAILABLE, Ordering::SeqCst);
                Err(NonceUnavailable)
            }
        }
    }

    /// The most recently issued nonce
    pub fn current(&self) -> Result<Nonce, NonceUnavailable> {
        match self.value.load(Ordering::SeqCst) {
            NONCE_UNAVAILABLE => Err(NonceUnavailable),
            nonce => Ok(nonce),
        }
    }
}

impl Default for NonceRegister {
    fn default() -> Self {
        Self::new()
    }
}
