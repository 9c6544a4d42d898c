//! Refresh Orchestrator
//!
//! Serves cached profiles and decides when and how deeply to refresh them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheRecord, FreshnessPolicy, ProfileStore};
use crate::config::RefreshPolicy;
use crate::error::{ProfileError, Result};
use crate::profile::{
    DataSource, FetchOutcome, PartialFetch, PlayerKey, Profile, ProfileFetcher, StatsAggregator,
};
use crate::tasks::{Enqueued, RefreshJob, RefreshScheduler};

/// How a lookup was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefreshState {
    /// Cached copy was fresh; nothing was fetched
    Fresh,
    /// Cached copy served as-is after a refresh attempt changed nothing
    Unchanged,
    /// Base profile refreshed, full update queued for later
    Scheduled,
    /// Base profile and detail stats refreshed in this call
    FullUpdate,
    /// Base fetch stopped part way; what arrived is saved but stays stale
    Partial,
}

/// A servable profile and any non-fatal error met while refreshing it.
#[derive(Debug)]
pub struct Lookup {
    pub profile: Profile,
    pub state: RefreshState,
    pub error: Option<ProfileError>,
}

impl Lookup {
    fn clean(profile: Profile, state: RefreshState) -> Self {
        Self {
            profile,
            state,
            error: None,
        }
    }
}

// == Profile Service ==
pub struct ProfileService {
    store: ProfileStore,
    source: Arc<dyn DataSource>,
    scheduler: Arc<dyn RefreshScheduler>,
    freshness: FreshnessPolicy,
    fetcher: ProfileFetcher,
    aggregator: StatsAggregator,
}

impl ProfileService {
    pub fn new(
        store: ProfileStore,
        source: Arc<dyn DataSource>,
        scheduler: Arc<dyn RefreshScheduler>,
        policy: &RefreshPolicy,
    ) -> Self {
        let freshness = FreshnessPolicy::new(policy.stale_after);
        Self {
            store,
            source,
            scheduler,
            freshness,
            fetcher: ProfileFetcher::new(freshness, policy.fetch_deadline),
            aggregator: StatsAggregator::from_policy(policy),
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn freshness(&self) -> &FreshnessPolicy {
        &self.freshness
    }

    // == Get Profile ==
    /// Returns the profile for `player`, refreshing it when stale or when a
    /// full update is requested.
    ///
    /// A fetched profile is persisted even when the fetch stopped part way;
    /// such a partial save keeps the previous `last_update` so it stays stale.
    /// A base lookup always queues the follow-up full update.
    /// `Err` means there is nothing to serve: the store could not be read,
    /// the cached payload is corrupt, or no cached copy exists and the fetch
    /// produced nothing.
    pub async fn get_profile(&self, player: &PlayerKey, full_update: bool) -> Result<Lookup> {
        let now = Utc::now();
        let record = self
            .store
            .get(player.as_str())
            .await
            .map_err(ProfileError::Store)?
            .unwrap_or_else(|| CacheRecord::virgin(player.as_str()));
        let cached = record.decode()?;

        if !full_update && !self.freshness.is_stale(record.last_update, now) {
            debug!(%player, "Cached profile is fresh");
            return Ok(Lookup::clean(cached, RefreshState::Fresh));
        }

        info!(%player, full_update, last_update = ?record.last_update, "Refreshing profile");
        let deadline = self.fetcher.deadline();
        let fetched = self
            .fetcher
            .fetch(self.source.as_ref(), player, &cached, now, deadline)
            .await;

        let (mut profile, mut fetch_error) = match fetched {
            Ok(FetchOutcome::Updated(profile)) => (profile, None),
            Ok(FetchOutcome::SourceNotFresher { source_update }) => {
                info!(%player, %source_update, "Source is no fresher than the cache");
                return Ok(Lookup::clean(cached, RefreshState::Unchanged));
            }
            Err(PartialFetch {
                profile: Some(partial),
                error,
            }) => (partial, Some(error)),
            Err(PartialFetch {
                profile: None,
                error,
            }) => {
                if cached.is_virgin() {
                    return Err(ProfileError::Unavailable {
                        player: player.to_string(),
                        source: Box::new(error),
                    });
                }
                warn!(%player, %error, "Refresh failed, serving cached profile");
                return Ok(Lookup {
                    profile: cached,
                    state: RefreshState::Unchanged,
                    error: Some(error),
                });
            }
        };

        let state = match (fetch_error.is_some(), full_update) {
            (true, _) => {
                // Keep the previous timestamp so the next lookup retries
                profile.last_update = cached.last_update;
                RefreshState::Partial
            }
            (false, true) => {
                profile.stats.clear();
                if let Err(e) = self
                    .aggregator
                    .fetch_all(self.source.clone(), player, &mut profile, deadline)
                    .await
                {
                    fetch_error = Some(e.into());
                }
                RefreshState::FullUpdate
            }
            (false, false) => RefreshState::Scheduled,
        };
        if !full_update {
            self.schedule_full_update(player, now).await;
        }

        let persist_error = self.persist(player, &profile).await.err();
        let error = match (fetch_error, persist_error) {
            (Some(fetch), Some(persist)) => {
                error!(%player, error = %persist, "Unable to save profile");
                Some(fetch)
            }
            (fetch, persist) => fetch.or(persist),
        };
        if let Some(e) = &error {
            warn!(%player, error = %e, "Refresh incomplete");
        }

        debug!(%player, %profile, ?state, "Profile refreshed");
        Ok(Lookup {
            profile,
            state,
            error,
        })
    }

    async fn persist(&self, player: &PlayerKey, profile: &Profile) -> Result<()> {
        let record = CacheRecord::encode(player, profile)?;
        self.store.put(&record).await.map_err(ProfileError::Persist)
    }

    /// Queues the follow-up full update; failures are only logged.
    async fn schedule_full_update(&self, player: &PlayerKey, now: DateTime<Utc>) {
        let job = RefreshJob::full_update(player.clone(), now.date_naive());
        match self.scheduler.enqueue(job).await {
            Ok(Enqueued::Queued) => debug!(%player, "Full update scheduled"),
            Ok(Enqueued::Duplicate) => debug!(%player, "Full update already pending today"),
            Err(e) => warn!(%player, error = %e, "Unable to schedule full update"),
        }
    }
}
