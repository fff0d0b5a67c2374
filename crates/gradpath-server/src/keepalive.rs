//! Compute-service keep-alive ping.
//!
//! The training backend idles out its GPU workers; a periodic health probe
//! keeps it warm so the first trigger after a quiet stretch is not stuck
//! behind a cold start.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gradpath_core::ComputeSettings;

pub fn spawn_keepalive(
    settings: ComputeSettings,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let url = format!("{}/health", settings.base_url.trim_end_matches('/'));
        info!("Keep-alive pinging {} every {:?}", url, interval);
        loop {
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Keep-alive ping ok");
                }
                Ok(response) => {
                    warn!("Keep-alive ping returned {}", response.status());
                }
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
