//! TTL Cleanup Task
//!
//! Store-level background task that periodically removes expired entries,
//! the way a real key-value backend expires keys on its own. The
//! orchestrator itself never sweeps; entries also read as absent the
//! moment their TTL elapses, so this task only reclaims memory early.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// Spawns a background task that periodically purges expired entries.
///
/// # Arguments
/// * `store` - Shared cache store
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    store: Arc<dyn CacheStore>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match store.purge_expired() {
                Ok(removed) if removed > 0 => {
                    info!("TTL cleanup: removed {} expired entries", removed);
                }
                Ok(_) => {
                    debug!("TTL cleanup: no expired entries found");
                }
                Err(e) => {
                    warn!("TTL cleanup failed: {}", e);
                }
            }
        }
    })
}
