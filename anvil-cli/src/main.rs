//! Anvil CLI
//!
//! Operator tooling for an Anvil cluster: key management and worker
//! discovery/status checks.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "anvil")]
#[command(about = "Anvil build dispatch CLI", long_about = None)]
struct Cli {
    /// Timeout for each worker request, in seconds
    #[arg(long, env = "ANVIL_REQUEST_TIMEOUT", default_value_t = 5)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        request_timeout: Duration::from_secs(cli.timeout),
    };

    handle_command(cli.command, &config).await
}
