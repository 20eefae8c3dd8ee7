//! Host command handlers
//!
//! Finds live workers in a numbered host range and reports worker status.

use anvil_client::discovery::parse_index_range;
use anvil_client::{HostRange, WorkerClient, discover};
use anvil_core::domain::worker::{DEFAULT_WORKER_PORT, WorkerAddress};
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::config::Config;

/// Host subcommands
#[derive(Subcommand)]
pub enum HostCommands {
    /// Probe a host range and list the workers that answer
    Discover {
        /// Host name prefix
        #[arg(long, default_value = "c")]
        prefix: String,

        /// Zero-padded width of the host index
        #[arg(long, default_value_t = 3)]
        width: usize,

        /// Inclusive index range, e.g. 1-64
        #[arg(long, default_value = "1-64")]
        range: String,

        /// Worker port
        #[arg(long, default_value_t = DEFAULT_WORKER_PORT)]
        port: u16,
    },
    /// Show whether the given workers are busy
    Status {
        /// Worker addresses (host or host:port)
        #[arg(required = true)]
        hosts: Vec<String>,
    },
}

/// Handle host commands
pub async fn handle_host_command(command: HostCommands, config: &Config) -> Result<()> {
    let client = WorkerClient::with_timeout(config.request_timeout)
        .context("Failed to build HTTP client")?
        .with_probe_timeout(config.request_timeout);

    match command {
        HostCommands::Discover {
            prefix,
            width,
            range,
            port,
        } => {
            let indices = parse_index_range(&range).map_err(|e| anyhow::anyhow!(e))?;
            let hosts = HostRange::new(prefix, width, indices).with_port(port);
            discover_hosts(&client, &hosts).await
        }
        HostCommands::Status { hosts } => show_status(&client, hosts).await,
    }
}

/// Print every responsive host, one per line
async fn discover_hosts(client: &WorkerClient, hosts: &HostRange) -> Result<()> {
    let candidates = hosts.candidates();
    let total = candidates.len();
    let alive = discover(client, candidates).await;

    for host in &alive {
        println!("{}", host);
    }

    eprintln!(
        "{}",
        format!("Done: {} of {} host(s) responded", alive.len(), total).dimmed()
    );
    Ok(())
}

/// Print the busy state of each worker
async fn show_status(client: &WorkerClient, hosts: Vec<String>) -> Result<()> {
    for host in hosts {
        let worker = WorkerAddress::new(host);
        match client.is_busy(&worker).await {
            Ok(true) => println!("  {} {}  {}", "▸".cyan(), worker.to_string().bold(), "busy".yellow()),
            Ok(false) => println!("  {} {}  {}", "▸".cyan(), worker.to_string().bold(), "idle".green()),
            Err(e) => println!(
                "  {} {}  {}",
                "▸".cyan(),
                worker.to_string().bold(),
                format!("error: {}", e).red()
            ),
        }
    }

    Ok(())
}
