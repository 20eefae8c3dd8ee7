//! Anvil Worker
//!
//! Accepts signed build jobs from the dispatcher, one at a time.
//!
//! Endpoints:
//! - GET  /api/is_busy   advisory busy flag
//! - GET  /api/get_nonce rotate and return the challenge nonce
//! - POST /api/work      verify a signed job and start it

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod service;

use crate::config::Config;
use crate::service::{JobExecutor, ShellExecutor, WorkerService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anvil_worker=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Anvil Worker...");

    let config = Config::from_env()?;
    config.validate()?;

    // Same key file as the dispatcher; only the public half is kept
    let verifying_key = anvil_core::keys::load_verifying_key(&config.key_file)
        .with_context(|| format!("Failed to load key from {}", config.key_file.display()))?;

    tracing::info!("Loaded dispatcher key from {}", config.key_file.display());

    let executor: Arc<dyn JobExecutor> = Arc::new(ShellExecutor::new(config.shell.clone()));
    let service = Arc::new(WorkerService::new(verifying_key, executor));

    let app = api::create_router(service, config.request_timeout);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
