//! Host discovery
//!
//! Probes a numbered range of candidate hosts (`c001`, `c002`, ...) in
//! parallel and returns the ones that answer. Every probe runs in its own
//! task; the caller waits until all of them have finished or timed out.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::str::FromStr;

use anvil_core::domain::worker::{DEFAULT_WORKER_PORT, WorkerAddress};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::WorkerClient;

/// A naming convention for candidate worker hosts
///
/// Index `i` maps to `{prefix}{i}` with `i` zero-padded to `width` digits,
/// plus `:{port}` when the port differs from the worker default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRange {
    pub prefix: String,
    pub width: usize,
    pub indices: RangeInclusive<u32>,
    pub port: u16,
}

impl HostRange {
    pub fn new(prefix: impl Into<String>, width: usize, indices: RangeInclusive<u32>) -> Self {
        Self {
            prefix: prefix.into(),
            width,
            indices,
            port: DEFAULT_WORKER_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Every candidate address in index order
    pub fn candidates(&self) -> Vec<WorkerAddress> {
        self.indices
            .clone()
            .map(|index| {
                let host = format!("{}{:0width$}", self.prefix, index, width = self.width);
                if self.port == DEFAULT_WORKER_PORT {
                    WorkerAddress::new(host)
                } else {
                    WorkerAddress::new(format!("{}:{}", host, self.port))
                }
            })
            .collect()
    }
}

impl Default for HostRange {
    fn default() -> Self {
        Self::new("c", 3, 1..=64)
    }
}

/// Parses an index range written as `first-last` (inclusive) or a single index
pub fn parse_index_range(text: &str) -> Result<RangeInclusive<u32>, String> {
    let text = text.trim();
    let (first, last) = match text.split_once('-') {
        Some((first, last)) => (first.trim(), last.trim()),
        None => (text, text),
    };

    let first = u32::from_str(first).map_err(|e| format!("invalid range start '{}': {}", first, e))?;
    let last = u32::from_str(last).map_err(|e| format!("invalid range end '{}': {}", last, e))?;

    if first > last {
        return Err(format!("range start {} is after range end {}", first, last));
    }

    Ok(first..=last)
}

/// Probes every candidate concurrently and returns the responsive ones
///
/// The result is deduplicated and sorted. The call returns only after every
/// probe has completed or hit the client's probe timeout.
pub async fn discover(client: &WorkerClient, candidates: Vec<WorkerAddress>) -> Vec<WorkerAddress> {
    let total = candidates.len();
    let mut probes = JoinSet::new();

    for candidate in candidates {
        let client = client.clone();
        probes.spawn(async move {
            let alive = client.probe(&candidate).await;
            alive.then_some(candidate)
        });
    }

    let mut alive = BTreeSet::new();
    while let Some(outcome) = probes.join_next().await {
        match outcome {
            Ok(Some(worker)) => {
                debug!("Host {} is alive", worker);
                alive.insert(worker);
            }
            Ok(None) => {}
            Err(e) => warn!("Probe task failed: {}", e),
        }
    }

    debug!("Discovery found {} of {} candidate(s)", alive.len(), total);
    alive.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use axum::{Json, Router, routing::get};
    use serde_json::json;

    async fn spawn_status_server() -> WorkerAddress {
        let app = Router::new().route(
            "/api/is_busy",
            get(|| async { Json(json!({ "busy": false })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        WorkerAddress::new(address.to_string())
    }

    /// Accepts connections and never answers on them
    async fn spawn_silent_server() -> WorkerAddress {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        WorkerAddress::new(address.to_string())
    }

    fn closed_address() -> WorkerAddress {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        WorkerAddress::new(address.to_string())
    }

    #[test]
    fn test_candidates_follow_naming_convention() {
        let range = HostRange::new("c", 3, 1..=3);
        let names: Vec<String> = range
            .candidates()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(names, ["c001", "c002", "c003"]);

        let range = HostRange::new("node-", 0, 9..=10).with_port(9000);
        let names: Vec<String> = range
            .candidates()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        assert_eq!(names, ["node-9:9000", "node-10:9000"]);
    }

    #[test]
    fn test_default_range_covers_pool() {
        let candidates = HostRange::default().candidates();
        assert_eq!(candidates.len(), 64);
        assert_eq!(candidates[0].as_str(), "c001");
        assert_eq!(candidates[63].as_str(), "c064");
    }

    #[test]
    fn test_parse_index_range() {
        assert_eq!(parse_index_range("1-64").unwrap(), 1..=64);
        assert_eq!(parse_index_range(" 7 ").unwrap(), 7..=7);
        assert!(parse_index_range("9-3").is_err());
        assert!(parse_index_range("a-3").is_err());
    }

    #[tokio::test]
    async fn test_discover_returns_sorted_live_hosts() {
        let probe_timeout = Duration::from_secs(2);
        let client = WorkerClient::new()
            .unwrap()
            .with_probe_timeout(probe_timeout);

        let second = spawn_status_server().await;
        let fourth = spawn_status_server().await;
        let candidates = vec![
            closed_address(),
            fourth.clone(),
            closed_address(),
            second.clone(),
            second.clone(),
        ];

        let found = discover(&client, candidates).await;

        let mut expected = vec![second, fourth];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn test_silent_hosts_are_bounded_by_probe_timeout() {
        let probe_timeout = Duration::from_millis(500);
        let client = WorkerClient::new()
            .unwrap()
            .with_probe_timeout(probe_timeout);

        let live = spawn_status_server().await;
        let mut candidates = vec![live.clone(), closed_address()];
        for _ in 0..3 {
            candidates.push(spawn_silent_server().await);
        }

        let started = Instant::now();
        let found = discover(&client, candidates).await;
        let elapsed = started.elapsed();

        assert_eq!(found, [live]);
        // Probes run concurrently: three silent hosts cost one timeout, not three
        assert!(elapsed >= probe_timeout);
        assert!(elapsed < probe_timeout * 2, "discovery took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_discover_with_no_candidates() {
        let client = WorkerClient::new().unwrap();
        assert!(discover(&client, Vec::new()).await.is_empty());
    }
}
