// src/connectivity.rs
//
// Lightweight reachability probe against the classification server's
// health endpoint. Any transport error or non-200 status means "not
// connected"; the distinction is not surfaced further. The result is
// advisory only and never gates the capture or inference path.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ConnectivityMonitor {
    http_client: reqwest::Client,
    health_url: String,
}

impl ConnectivityMonitor {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, HEALTH_PROBE_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            health_url: format!("{}/health", base_url.trim_end_matches('/')),
        })
    }

    /// One probe, one boolean. Idempotent: probing twice yields two
    /// independent results with no caching in between.
    pub async fn probe(&self) -> bool {
        match self.http_client.get(&self.health_url).send().await {
            Ok(response) if response.status().is_success() => {
                info!(url = %self.health_url, "classification server reachable");
                true
            }
            Ok(response) => {
                warn!(
                    url = %self.health_url,
                    status = %response.status(),
                    "health probe got non-200 status"
                );
                false
            }
            Err(e) => {
                warn!(url = %self.health_url, "health probe failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_canned_server, spawn_silent_server};

    #[tokio::test]
    async fn test_probe_reachable_twice() {
        let (base_url, mut requests) = spawn_canned_server(200, r#"{"status":"healthy"}"#).await;
        let monitor = ConnectivityMonitor::new(&base_url).unwrap();

        assert!(monitor.probe().await);
        assert!(monitor.probe().await);

        let first = requests.recv().await.unwrap();
        assert!(String::from_utf8_lossy(&first).starts_with("GET /health"));
    }

    #[tokio::test]
    async fn test_probe_non_200_means_unreachable() {
        let (base_url, _requests) = spawn_canned_server(500, "{}").await;
        let monitor = ConnectivityMonitor::new(&base_url).unwrap();
        assert!(!monitor.probe().await);
    }

    #[tokio::test]
    async fn test_probe_transport_failure_means_unreachable() {
        let monitor = ConnectivityMonitor::new("http://127.0.0.1:9").unwrap();
        assert!(!monitor.probe().await);
    }

    #[tokio::test]
    async fn test_probe_timeout_means_unreachable() {
        // The silent server never answers; only the probe timeout ends this.
        let base_url = spawn_silent_server().await;
        let monitor =
            ConnectivityMonitor::with_timeout(&base_url, Duration::from_millis(250)).unwrap();
        assert!(!monitor.probe().await);
    }
}
