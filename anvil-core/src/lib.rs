//! Anvil Core
//!
//! Core types and abstractions shared by the Anvil dispatcher and workers.
//!
//! This crate contains:
//! - Domain types: jobs, worker addresses, nonces
//! - DTOs: JSON payloads exchanged with the worker endpoints
//! - Signing: canonical job messages and their signatures
//! - Keys: loading and persisting the dispatcher key file

pub mod domain;
pub mod dto;
pub mod keys;
pub mod signing;

pub use keys::KeyError;
pub use signing::{JobSignature, SignatureError, SigningKey, VerifyingKey};
