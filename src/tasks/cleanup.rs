//! Volatile Tier Cleanup Task
//!
//! Background task that periodically drops expired volatile entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::VolatileCache;

/// Spawns a task that sweeps expired entries every `cleanup_interval_secs`.
///
/// The returned handle is aborted on shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<VolatileCache>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting volatile cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired(Utc::now())
            };

            if removed > 0 {
                info!("Volatile cleanup: removed {} expired entries", removed);
            } else {
                debug!("Volatile cleanup: no expired entries found");
            }
        }
    })
}
