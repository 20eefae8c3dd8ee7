//! Key file handling
//!
//! The dispatcher key is a 32-byte Ed25519 seed stored as one line of
//! lowercase hex. Workers read the same file and derive the verifying key
//! from it.

use std::fs;
use std::io::Write;
use std::path::Path;

use rand::rngs::OsRng;
use thiserror::Error;

use crate::signing::{SigningKey, VerifyingKey};

/// Errors that can occur while reading or writing a key file
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("key file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid key encoding: {0}")]
    InvalidEncoding(String),
}

/// Generates a fresh signing key from the operating system RNG
pub fn generate_signing_key() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Parses a hex-encoded key seed
pub fn decode_signing_key(text: &str) -> Result<SigningKey, KeyError> {
    let bytes = hex::decode(text.trim()).map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
    let seed: [u8; 32] = bytes.try_into().map_err(|bytes: Vec<u8>| {
        KeyError::InvalidEncoding(format!("expected 32 bytes, got {}", bytes.len()))
    })?;

    Ok(SigningKey::from_bytes(&seed))
}

/// Hex encoding of a key seed, as written to disk
pub fn encode_signing_key(key: &SigningKey) -> String {
    hex::encode(key.to_bytes())
}

/// Hex encoding of a public key, for display
pub fn encode_verifying_key(key: &VerifyingKey) -> String {
    hex::encode(key.to_bytes())
}

/// Loads the private signing key from `path`
pub fn load_signing_key(path: impl AsRef<Path>) -> Result<SigningKey, KeyError> {
    let text = fs::read_to_string(path)?;
    decode_signing_key(&text)
}

/// Loads the private key file at `path` and returns its public half
pub fn load_verifying_key(path: impl AsRef<Path>) -> Result<VerifyingKey, KeyError> {
    Ok(load_signing_key(path)?.verifying_key())
}

/// Writes `key` to `path`, readable only by the owner on unix
///
/// Fails if the file already exists unless `overwrite` is set.
pub fn save_signing_key(
    path: impl AsRef<Path>,
    key: &SigningKey,
    overwrite: bool,
) -> Result<(), KeyError> {
    let mut options = fs::OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    writeln!(file, "{}", encode_signing_key(key))?;
    Ok(())
}
