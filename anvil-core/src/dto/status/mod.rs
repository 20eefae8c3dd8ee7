//! Status DTOs

use serde::{Deserialize, Serialize};

/// Response of the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyMessage {
    pub busy: bool,
}
