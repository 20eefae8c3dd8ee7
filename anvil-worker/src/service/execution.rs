//! Execution service
//!
//! Runs an admitted job's command inside its working directory. The output
//! goes straight to this process's stdout/stderr; only success or failure
//! is reported back.

use anvil_core::domain::job::{JobDescriptor, JobResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Service trait for executing jobs
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Runs `job` to completion
    ///
    /// An `Err` means the job could not be started at all; a job that ran
    /// and failed comes back as an unsuccessful [`JobResult`].
    async fn execute(&self, job: &JobDescriptor) -> anyhow::Result<JobResult>;
}

/// Runs the job command through a shell (`sh -c <command>`)
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("sh")
    }
}

#[async_trait]
impl JobExecutor for ShellExecutor {
    async fn execute(&self, job: &JobDescriptor) -> anyhow::Result<JobResult> {
        debug!("Spawning '{} -c {}' in {}", self.shell, job.command, job.dir);

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(&job.command)
            .current_dir(&job.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start '{}' in {}: {}", job.command, job.dir, e))?;

        if status.success() {
            Ok(JobResult::succeeded())
        } else {
            Ok(JobResult::failed(
                status.code(),
                format!("Command exited with {}", status),
            ))
        }
    }
}
