//! Stats Report Task
//!
//! Background task that periodically logs cache statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::KingCache;

/// Spawns a background task that logs a JSON stats snapshot every
/// `interval_secs` seconds.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(KingCache::new());
/// let report_handle = spawn_stats_reporter(cache.clone(), 30);
/// // Later, during shutdown:
/// report_handle.abort();
/// ```
pub fn spawn_stats_reporter(cache: Arc<KingCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let stats = cache.stats();
            match serde_json::to_string(&stats) {
                Ok(json) => info!(stats = %json, "Cache stats"),
                Err(err) => warn!(error = %err, "Failed to serialize cache stats"),
            }
        }
    })
}
