//! Freshness Policy
//!
//! Decides whether a cached profile may be served as-is.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

/// Reference staleness threshold (24 hours).
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

// == Freshness Policy ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    stale_after: Duration,
}

impl FreshnessPolicy {
    pub fn new(stale_after: Duration) -> Self {
        Self { stale_after }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    // == Is Stale ==
    /// Returns true once `now - last_update` reaches the threshold.
    ///
    /// An unset timestamp is always stale. The boundary itself is stale.
    /// A timestamp ahead of `now` counts as fresh.
    pub fn is_stale(&self, last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_update {
            None => true,
            Some(updated) => match (now - updated).to_std() {
                Ok(age) => age >= self.stale_after,
                Err(_) => false,
            },
        }
    }

    /// True once `now - updated` is strictly past the threshold.
    ///
    /// Used for the source's own timestamp, where exactly the threshold
    /// still counts as current.
    pub fn has_outlived(&self, updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - updated).to_std() {
            Ok(age) => age > self.stale_after,
            Err(_) => false,
        }
    }

    /// Newest timestamp that is stale at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        TimeDelta::from_std(self.stale_after)
            .ok()
            .and_then(|threshold| now.checked_sub_signed(threshold))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}

/// [`FreshnessPolicy::is_stale`] with the reference 24 hour threshold.
pub fn is_stale(last_update: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    FreshnessPolicy::default().is_stale(last_update, now)
}
