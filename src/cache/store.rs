//! Volatile Store Module
//!
//! Fast, bounded, best-effort tier in front of the durable store. Entries
//! expire by TTL and are evicted least-recently-used first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::cache::{CacheRecord, LruTracker, VolatileEntry, VolatileStats};
use crate::cache::{MAX_KEY_LENGTH, MAX_RECORD_SIZE};

/// Why the volatile tier refused a write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WarmError {
    #[error("key exceeds maximum length of {limit} bytes")]
    KeyTooLong { limit: usize },

    #[error("record of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("volatile tier is full and eviction failed")]
    Full,
}

/// Outcome of a cache-warming write. Callers log and discard it.
pub type BestEffort = std::result::Result<(), WarmError>;

/// Same key space as the durable store; absence and failure both read as a miss.
#[async_trait]
pub trait VolatileStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<CacheRecord>;

    async fn set(&self, record: CacheRecord) -> BestEffort;
}

// == Volatile Cache ==
/// Synchronous core of the in-memory volatile tier.
#[derive(Debug)]
pub struct VolatileCache {
    entries: HashMap<String, VolatileEntry>,
    lru: LruTracker,
    stats: VolatileStats,
    max_entries: usize,
    ttl: Option<TimeDelta>,
}

impl VolatileCache {
    /// Creates a cache holding at most `max_entries` records for `ttl` each.
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: VolatileStats::new(),
            max_entries,
            ttl: ttl.and_then(|ttl| TimeDelta::from_std(ttl).ok()),
        }
    }

    // == Set ==
    /// Stores a record, overwriting any previous one under the same key and
    /// evicting the least recently used entry when full.
    pub fn set(&mut self, record: CacheRecord, now: DateTime<Utc>) -> BestEffort {
        if record.key.len() > MAX_KEY_LENGTH {
            self.stats.record_rejection();
            return Err(WarmError::KeyTooLong {
                limit: MAX_KEY_LENGTH,
            });
        }
        if record.size() > MAX_RECORD_SIZE {
            self.stats.record_rejection();
            return Err(WarmError::TooLarge {
                size: record.size(),
                limit: MAX_RECORD_SIZE,
            });
        }

        let is_overwrite = self.entries.contains_key(&record.key);
        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => return Err(WarmError::Full),
            }
        }

        let key = record.key.clone();
        self.entries
            .insert(key.clone(), VolatileEntry::new(record, self.ttl, now));
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Get ==
    /// Returns the record if present and unexpired. Expired entries are dropped.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<CacheRecord> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.record.clone())
    }

    // == Cleanup Expired ==
    /// Drops every expired entry and returns how many were removed.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    pub fn stats(&self) -> VolatileStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Memory Volatile Store ==
/// Shared, async handle over a [`VolatileCache`].
#[derive(Debug, Clone)]
pub struct MemoryVolatileStore {
    cache: Arc<RwLock<VolatileCache>>,
}

impl MemoryVolatileStore {
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(VolatileCache::new(max_entries, ttl))),
        }
    }

    /// The underlying cache, for the expiry sweep task.
    pub fn cache(&self) -> Arc<RwLock<VolatileCache>> {
        self.cache.clone()
    }

    pub async fn stats(&self) -> VolatileStats {
        self.cache.read().await.stats()
    }
}

#[async_trait]
impl VolatileStore for MemoryVolatileStore {
    async fn get(&self, key: &str) -> Option<CacheRecord> {
        // Write lock: reads update LRU order and stats
        self.cache.write().await.get(key, Utc::now())
    }

    async fn set(&self, record: CacheRecord) -> BestEffort {
        self.cache.write().await.set(record, Utc::now())
    }
}
