//! Busy gate
//!
//! Admission control for this worker: at most one job runs at a time. The
//! gate flips `idle -> busy` with a compare-and-set, so of any number of
//! concurrent submissions exactly one wins.

use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot busy flag
#[derive(Debug, Default)]
pub struct BusyGate {
    busy: AtomicBool,
}

impl BusyGate {
    /// Creates an idle gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the gate to busy; true if this call did the transition
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Moves the gate back to idle; false means it was already idle
    pub fn release(&self) -> bool {
        self.busy
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Current state, for status reporting only
    pub fn peek(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
