//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
///
/// The intervals are tunable without affecting correctness; they trade
/// responsiveness against idle churn.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How long to wait before re-polling an empty queue
    pub idle_poll_interval: Duration,
    /// Period of the reconciliation safety net
    pub reconcile_interval: Duration,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
    /// Directory holding raw uploaded sources
    pub ingest_dir: PathBuf,
    /// Directory receiving transcoded renditions
    pub output_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_poll_interval: Duration::from_secs(5),
            reconcile_interval: Duration::from_secs(30 * 60),
            shutdown_timeout: Duration::from_secs(30),
            ingest_dir: PathBuf::from("/var/lib/vodflow/ingest"),
            output_dir: PathBuf::from("/var/lib/vodflow/renditions"),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            idle_poll_interval: Duration::from_secs(
                std::env::var("WORKER_IDLE_POLL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            reconcile_interval: Duration::from_secs(
                std::env::var("WORKER_RECONCILE_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30 * 60),
            ),
            shutdown_timeout: Duration::from_secs(
                std::env::var("WORKER_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            ingest_dir: std::env::var("WORKER_INGEST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/lib/vodflow/ingest")),
            output_dir: std::env::var("WORKER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/lib/vodflow/renditions")),
        }
    }
}
