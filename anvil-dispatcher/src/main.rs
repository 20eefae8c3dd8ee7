//! Anvil Dispatcher
//!
//! Hands a backlog of build jobs to a pool of Anvil workers, one job per
//! worker at a time, signing every job so workers can tell it came from us.
//!
//! Architecture:
//! - Configuration: settings from environment variables or defaults
//! - Backlog: ordered job list and initial hosts from a JSON file
//! - Services: worker pool discovery
//! - Scheduler: the dispatch loop itself
//!
//! The dispatcher only stops on its own once every job has been accepted.

mod backlog;
mod config;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::backlog::Backlog;
use crate::config::Config;
use crate::scheduler::Dispatcher;
use crate::service::{HostRangeDiscovery, WorkerPoolSource};
use anvil_client::{WorkerApi, WorkerClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anvil_dispatcher=info,anvil_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Anvil Dispatcher");

    let config = Config::from_env().context("Invalid configuration")?;
    config.validate()?;

    let signing_key = anvil_core::keys::load_signing_key(&config.key_file)
        .with_context(|| format!("Failed to load key from {}", config.key_file.display()))?;

    let backlog = Backlog::load(&config.backlog_file, config.discovery.is_some())?;
    info!(
        "Loaded {} job(s) and {} host(s) from {}",
        backlog.work.len(),
        backlog.hosts.len(),
        config.backlog_file.display()
    );

    let client = WorkerClient::with_timeout(config.request_timeout)
        .context("Failed to build HTTP client")?;
    let api: Arc<dyn WorkerApi> = Arc::new(client.clone());

    let mut dispatcher = Dispatcher::new(api, signing_key, backlog.hosts, config.retry_backoff);

    if let Some(discovery) = &config.discovery {
        info!(
            "Host discovery enabled: {} candidate(s), refresh every {:?}",
            discovery.hosts.candidates().len(),
            discovery.refresh_interval
        );
        let probe_client = client.with_probe_timeout(discovery.probe_timeout);
        let source: Arc<dyn WorkerPoolSource> = Arc::new(HostRangeDiscovery::new(
            probe_client,
            discovery.hosts.clone(),
        ));
        dispatcher = dispatcher.with_pool_source(source, discovery.refresh_interval);
    }

    let report = dispatcher.run(backlog.work).await;

    info!(
        "All {} job(s) dispatched across {} known host(s)",
        report.assignments.len(),
        dispatcher.pool().len()
    );
    for assignment in &report.assignments {
        info!(
            "  - {} -> {} (after {} pass(es))",
            assignment.job, assignment.worker, assignment.passes
        );
    }

    Ok(())
}
