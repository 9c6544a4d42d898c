//! Reload Sweep
//!
//! Queues a base refresh for every stale profile in the durable store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::{DurableStore, FreshnessPolicy, StoreError};
use crate::profile::PlayerKey;
use crate::tasks::{Enqueued, RefreshJob, RefreshScheduler};

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReloadSummary {
    pub found: usize,
    pub queued: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Enqueues a base refresh for each stale record, at most one per player per day.
pub async fn reload_expired(
    store: &dyn DurableStore,
    scheduler: &dyn RefreshScheduler,
    freshness: &FreshnessPolicy,
    now: DateTime<Utc>,
) -> Result<ReloadSummary, StoreError> {
    let expired = store
        .list_updated_before(freshness.cutoff(now), usize::MAX)
        .await?;
    info!(count = expired.len(), "Found expired profiles");

    let today = now.date_naive();
    let mut summary = ReloadSummary {
        found: expired.len(),
        ..ReloadSummary::default()
    };

    for record in expired {
        let player = match PlayerKey::parse(&record.key) {
            Ok(player) => player,
            Err(e) => {
                warn!(key = %record.key, error = %e, "Skipping unparseable stored key");
                summary.failed += 1;
                continue;
            }
        };

        match scheduler.enqueue(RefreshJob::reload(player, today)).await {
            Ok(Enqueued::Queued) => {
                debug!(key = %record.key, "Added reload job");
                summary.queued += 1;
            }
            Ok(Enqueued::Duplicate) => summary.duplicates += 1,
            Err(e) => {
                warn!(key = %record.key, error = %e, "Error scheduling reload");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Spawns a task that runs [`reload_expired`] every `interval_secs` seconds.
pub fn spawn_reload_task(
    store: Arc<dyn DurableStore>,
    scheduler: Arc<dyn RefreshScheduler>,
    freshness: FreshnessPolicy,
    interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting reload task with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match reload_expired(store.as_ref(), scheduler.as_ref(), &freshness, Utc::now()).await {
                Ok(summary) => info!(
                    found = summary.found,
                    queued = summary.queued,
                    duplicates = summary.duplicates,
                    failed = summary.failed,
                    "Reload sweep done"
                ),
                Err(e) => error!(error = %e, "Error loading expired profiles"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheRecord, MemoryStore};
    use crate::tasks::RefreshQueue;
    use chrono::TimeDelta;

    async fn seeded_store(now: DateTime<Utc>) -> MemoryStore {
        let store = MemoryStore::new();
        for (key, age) in [("fresh", 1), ("stale", 30), ("ancient", 400)] {
            let record = CacheRecord {
                key: key.to_string(),
                last_update: Some(now - TimeDelta::hours(age)),
                payload: b"{}".to_vec(),
            };
            store.put(&record).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_reload_queues_only_stale_players() {
        let now = Utc::now();
        let store = seeded_store(now).await;
        let (queue, mut rx) = RefreshQueue::new();

        let summary = reload_expired(&store, &queue, &FreshnessPolicy::default(), now)
            .await
            .unwrap();

        assert_eq!(summary.found, 2);
        assert_eq!(summary.queued, 2);

        let mut queued = vec![rx.try_recv().unwrap(), rx.try_recv().unwrap()];
        queued.sort_by(|a, b| a.player.as_str().cmp(b.player.as_str()));
        assert_eq!(queued[0].player.as_str(), "ancient");
        assert_eq!(queued[1].player.as_str(), "stale");
        assert!(queued.iter().all(|job| !job.full_update));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_second_sweep_same_day_is_deduplicated() {
        let now = Utc::now();
        let store = seeded_store(now).await;
        let (queue, _rx) = RefreshQueue::new();
        let freshness = FreshnessPolicy::default();

        reload_expired(&store, &queue, &freshness, now).await.unwrap();
        let again = reload_expired(&store, &queue, &freshness, now).await.unwrap();

        assert_eq!(again.queued, 0);
        assert_eq!(again.duplicates, 2);
    }

    #[tokio::test]
    async fn test_closed_queue_counts_failures() {
        let now = Utc::now();
        let store = seeded_store(now).await;
        let (queue, rx) = RefreshQueue::new();
        drop(rx);

        let summary = reload_expired(&store, &queue, &FreshnessPolicy::default(), now)
            .await
            .unwrap();
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.queued, 0);
    }
}
