//! Job domain types

use serde::{Deserialize, Serialize};

/// One unit of work from the backlog
///
/// Runs `command` inside working directory `dir` on whichever worker
/// accepts it. Both fields are embedded verbatim in the signed message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub dir: String,
    pub command: String,
}

impl JobDescriptor {
    pub fn new(dir: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            command: command.into(),
        }
    }
}

impl std::fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.dir, self.command)
    }
}

/// Result of a job execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub error_message: Option<String>,
}

impl JobResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            error_message: None,
        }
    }

    pub fn failed(exit_code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            error_message: Some(message.into()),
        }
    }
}
