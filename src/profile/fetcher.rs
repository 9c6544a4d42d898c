//! Profile Fetcher
//!
//! Assembles the base profile (arena, roster, ships) from the external source.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::cache::FreshnessPolicy;
use crate::error::ProfileError;
use crate::profile::source::{DataSource, SourceError};
use crate::profile::{PlayerKey, Profile};

/// Result of a base fetch that ran to completion.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Arena, roster and ships were refreshed
    Updated(Profile),
    /// The source is itself stale; the cached copy is as good as it gets
    SourceNotFresher { source_update: DateTime<Utc> },
}

/// A base fetch that failed part way.
///
/// `profile` holds whatever was assembled before the failure, or `None` when
/// the very first call failed.
#[derive(Debug)]
pub struct PartialFetch {
    pub profile: Option<Profile>,
    pub error: ProfileError,
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileFetcher {
    freshness: FreshnessPolicy,
    budget: Duration,
}

impl ProfileFetcher {
    pub fn new(freshness: FreshnessPolicy, budget: Duration) -> Self {
        Self { freshness, budget }
    }

    /// Deadline for a refresh starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.budget
    }

    // == Fetch ==
    /// Loads arena, then roster, then ships, starting from `existing`.
    ///
    /// Short-circuits when `existing` was fetched before and the source's own
    /// arena timestamp is older than the threshold at `now`.
    pub async fn fetch(
        &self,
        source: &dyn DataSource,
        player: &PlayerKey,
        existing: &Profile,
        now: DateTime<Utc>,
        deadline: Instant,
    ) -> Result<FetchOutcome, PartialFetch> {
        debug!(%player, "Loading arena team");
        let arena = self
            .call(deadline, source.fetch_arena_lineup(player))
            .await
            .map_err(|error| PartialFetch {
                profile: None,
                error,
            })?;
        debug!(%player, source_update = %arena.last_update, "Source last update");

        if !existing.is_virgin() && self.freshness.has_outlived(arena.last_update, now) {
            debug!(%player, "Source is as old as the cache, keeping cached profile");
            return Ok(FetchOutcome::SourceNotFresher {
                source_update: arena.last_update,
            });
        }

        let mut profile = existing.clone();
        profile.arena = arena.lineup;
        profile.last_update = Some(arena.last_update);

        debug!(%player, "Loading collection");
        match self.call(deadline, source.fetch_collection(player)).await {
            Ok(collection) => profile.collection = collection,
            Err(error) => {
                return Err(PartialFetch {
                    profile: Some(profile),
                    error,
                })
            }
        }

        debug!(%player, "Loading ships");
        match self.call(deadline, source.fetch_ships(player)).await {
            Ok(ships) => profile.ships = ships,
            Err(error) => {
                return Err(PartialFetch {
                    profile: Some(profile),
                    error,
                })
            }
        }

        Ok(FetchOutcome::Updated(profile))
    }

    async fn call<T>(
        &self,
        deadline: Instant,
        request: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, ProfileError> {
        match timeout_at(deadline, request).await {
            Ok(result) => result.map_err(ProfileError::Fetch),
            Err(_) => Err(ProfileError::DeadlineExceeded(self.budget)),
        }
    }
}
