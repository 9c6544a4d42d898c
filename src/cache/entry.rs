//! Volatile Entry Module
//!
//! A cache record held by the volatile tier together with its expiry.

use chrono::{DateTime, TimeDelta, Utc};

use crate::cache::CacheRecord;

// == Volatile Entry ==
#[derive(Debug, Clone)]
pub struct VolatileEntry {
    pub record: CacheRecord,
    pub stored_at: DateTime<Utc>,
    /// None = kept until evicted
    pub expires_at: Option<DateTime<Utc>>,
}

impl VolatileEntry {
    pub fn new(record: CacheRecord, ttl: Option<TimeDelta>, now: DateTime<Utc>) -> Self {
        Self {
            record,
            stored_at: now,
            expires_at: ttl.and_then(|ttl| now.checked_add_signed(ttl)),
        }
    }

    /// Expired once `now` reaches the expiry time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}
