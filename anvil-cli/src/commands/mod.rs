//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod host;
mod key;

pub use host::HostCommands;
pub use key::KeyCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Signing key management
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
    /// Worker discovery and status
    Host {
        #[command(subcommand)]
        command: HostCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Key { command } => key::handle_key_command(command),
        Commands::Host { command } => host::handle_host_command(command, config).await,
    }
}
