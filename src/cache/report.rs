//! Player Statistics
//!
//! System-wide view of how fresh the cached profiles are.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{DurableStore, FreshnessPolicy, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub player_count: usize,
    pub stale_player_count: usize,
    pub oldest_player_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StalePlayer {
    pub key: String,
    pub last_update: Option<DateTime<Utc>>,
}

/// Counts all players, the stale ones, and the oldest sync time.
pub async fn gather_player_stats(
    store: &dyn DurableStore,
    freshness: &FreshnessPolicy,
    now: DateTime<Utc>,
) -> Result<PlayerStats, StoreError> {
    Ok(PlayerStats {
        player_count: store.count().await?,
        stale_player_count: store.count_updated_before(freshness.cutoff(now)).await?,
        oldest_player_sync: store.oldest_update().await?,
    })
}

/// The `limit` stale players that have gone longest without a sync.
pub async fn list_stale_players(
    store: &dyn DurableStore,
    freshness: &FreshnessPolicy,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<StalePlayer>, StoreError> {
    let records = store
        .list_updated_before(freshness.cutoff(now), limit)
        .await?;
    Ok(records
        .into_iter()
        .map(|record| StalePlayer {
            key: record.key,
            last_update: record.last_update,
        })
        .collect())
}
