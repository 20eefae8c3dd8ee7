//! Core domain types
//!
//! This module contains the core domain structures used across Anvil services.
//! These types are shared between the dispatcher (which signs and submits work)
//! and the workers (which verify and execute it).

pub mod job;
pub mod nonce;
pub mod worker;
