//! Configuration from environment and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level GradPath configuration.
#[derive(Debug, Clone)]
pub struct GradPathConfig {
    /// HTTP server port.
    pub port: u16,
    /// Directory holding the SQLite database.
    pub data_dir: PathBuf,
    /// Compute backend client settings.
    pub compute: ComputeSettings,
    /// Orchestrator settings.
    pub precompute: PrecomputeSettings,
    /// Period of the reconciliation worker.
    pub sync_interval: Duration,
    /// Period of the compute-service keep-alive ping.
    pub keepalive_interval: Duration,
}

/// Settings for the external RL training service.
#[derive(Debug, Clone)]
pub struct ComputeSettings {
    /// Base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout. Training calls are slow.
    pub timeout: Duration,
}

/// Tunables for job dispatch and request building.
#[derive(Debug, Clone)]
pub struct PrecomputeSettings {
    /// Episode count when the caller does not pass one explicitly.
    pub default_episodes: u32,
    /// Planning horizon sent to the trainer.
    pub max_semesters: u32,
    /// Fixed seed for reproducible training runs.
    pub seed: u64,
    /// Pause between sequential triggers during a sync pass.
    pub trigger_delay: Duration,
    /// Cap on the job-status observability snapshot.
    pub recent_jobs_limit: usize,
}

impl Default for PrecomputeSettings {
    fn default() -> Self {
        Self {
            default_episodes: 1,
            max_semesters: 8,
            seed: 42,
            trigger_delay: Duration::from_millis(500),
            recent_jobs_limit: 10,
        }
    }
}

impl GradPathConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Self {
        let port = env_parse("PORT", 8080);

        let compute = ComputeSettings {
            base_url: std::env::var("COMPUTE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            timeout: Duration::from_secs(env_parse("COMPUTE_TIMEOUT_SECS", 120u64)),
        };

        let precompute = PrecomputeSettings {
            default_episodes: env_parse("DEFAULT_EPISODES", 1),
            trigger_delay: Duration::from_millis(env_parse("TRIGGER_DELAY_MS", 500u64)),
            ..PrecomputeSettings::default()
        };

        Self {
            port,
            data_dir: data_dir.as_ref().to_path_buf(),
            compute,
            precompute,
            sync_interval: Duration::from_secs(env_parse("SYNC_INTERVAL_SECS", 60u64)),
            keepalive_interval: Duration::from_secs(env_parse("KEEPALIVE_INTERVAL_SECS", 600u64)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
