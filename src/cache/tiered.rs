//! Tiered Profile Store
//!
//! Read-through / write-through over the durable store with an optional
//! volatile tier in front of it.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::cache::{CacheRecord, DurableStore, StoreError, VolatileStore};

/// Record access for the orchestrator.
///
/// The durable store is authoritative. Volatile tier writes are best-effort:
/// their failures are logged and never reach the caller.
#[derive(Clone)]
pub struct ProfileStore {
    durable: Arc<dyn DurableStore>,
    volatile: Option<Arc<dyn VolatileStore>>,
}

impl ProfileStore {
    pub fn new(durable: Arc<dyn DurableStore>, volatile: Option<Arc<dyn VolatileStore>>) -> Self {
        Self { durable, volatile }
    }

    /// A store without a volatile tier.
    pub fn durable_only(durable: Arc<dyn DurableStore>) -> Self {
        Self::new(durable, None)
    }

    pub fn durable(&self) -> &Arc<dyn DurableStore> {
        &self.durable
    }

    // == Get ==
    /// Volatile tier first, then the durable store. A durable hit re-warms
    /// the volatile tier.
    pub async fn get(&self, key: &str) -> Result<Option<CacheRecord>, StoreError> {
        if let Some(volatile) = &self.volatile {
            if let Some(record) = volatile.get(key).await {
                trace!(player = key, "Volatile tier hit");
                return Ok(Some(record));
            }
            debug!(player = key, "Not in volatile tier, reading durable store");
        }

        let record = self.durable.get(key).await?;
        if let Some(record) = &record {
            self.warm(record).await;
        }
        Ok(record)
    }

    // == Put ==
    /// Durable write first; the volatile tier is only touched on success.
    pub async fn put(&self, record: &CacheRecord) -> Result<(), StoreError> {
        self.durable.put(record).await?;
        self.warm(record).await;
        Ok(())
    }

    async fn warm(&self, record: &CacheRecord) {
        let Some(volatile) = &self.volatile else {
            return;
        };
        if let Err(e) = volatile.set(record.clone()).await {
            warn!(player = %record.key, error = %e, "Unable to populate volatile tier");
        }
    }
}
