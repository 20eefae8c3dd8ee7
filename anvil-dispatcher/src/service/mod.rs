//! Service layer
//!
//! Services the dispatch loop depends on. They are trait-based so the loop
//! can be tested without a network.

mod pool;

pub use pool::{HostRangeDiscovery, WorkerPoolSource};
