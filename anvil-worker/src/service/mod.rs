//! Service layer
//!
//! Worker-side business logic: the nonce register, the busy gate, job
//! execution, and the admission protocol tying them together.
//!
//! Job execution is trait-based so tests can substitute it.

pub mod admission;
pub mod busy;
pub mod execution;
pub mod nonce;

#[cfg(test)]
pub(crate) mod testing;

pub use admission::{AdmissionError, WorkerService};
pub use execution::{JobExecutor, ShellExecutor};
pub use nonce::{NonceRegister, NonceUnavailable};
