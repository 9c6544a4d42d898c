//! Durable Store Module
//!
//! Authoritative record storage plus the range queries used by the admin
//! statistics view.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::CacheRecord;

/// Hard failure of the durable store. A missing key is not an error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait DurableStore: Send + Sync {
    /// `Ok(None)` when the key was never stored.
    async fn get(&self, key: &str) -> Result<Option<CacheRecord>, StoreError>;

    /// Inserts or overwrites the record under `record.key`.
    async fn put(&self, record: &CacheRecord) -> Result<(), StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    /// Records whose last update is unset or at/before `cutoff`.
    async fn count_updated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Smallest last update across all records.
    async fn oldest_update(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Up to `limit` records updated at/before `cutoff`, oldest first.
    async fn list_updated_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheRecord>, StoreError>;
}

fn updated_before(record: &CacheRecord, cutoff: DateTime<Utc>) -> bool {
    record.last_update.map_or(true, |updated| updated <= cutoff)
}

// == Memory Store ==
/// In-memory durable store, optionally mirrored to a JSON snapshot file.
///
/// With a snapshot, every put rewrites the file (temp file + rename). A put
/// whose snapshot write fails is rolled back.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, CacheRecord>>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// A store that lives only as long as the process.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a snapshot-backed store, loading existing records if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let records: Vec<CacheRecord> = serde_json::from_slice(&bytes)?;
                records
                    .into_iter()
                    .map(|record| (record.key.clone(), record))
                    .collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        info!(path = %path.display(), records = records.len(), "Durable store opened");
        Ok(Self {
            records: RwLock::new(records),
            snapshot: Some(path),
        })
    }

    async fn write_snapshot(&self, records: &HashMap<String, CacheRecord>) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let mut sorted: Vec<&CacheRecord> = records.values().collect();
        sorted.sort_by(|a, b| a.key.cmp(&b.key));
        let bytes = serde_json::to_vec(&sorted)?;

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), records = records.len(), "Snapshot written");
        Ok(())
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheRecord>, StoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn put(&self, record: &CacheRecord) -> Result<(), StoreError> {
        // Held across the snapshot write so snapshots land in put order
        let mut records = self.records.write().await;
        let previous = records.insert(record.key.clone(), record.clone());

        if let Err(e) = self.write_snapshot(&records).await {
            match previous {
                Some(previous) => records.insert(record.key.clone(), previous),
                None => records.remove(&record.key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }

    async fn count_updated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| updated_before(record, cutoff))
            .count())
    }

    async fn oldest_update(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter_map(|record| record.last_update)
            .min())
    }

    async fn list_updated_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheRecord>, StoreError> {
        let records = self.records.read().await;
        let mut stale: Vec<&CacheRecord> = records
            .values()
            .filter(|record| updated_before(record, cutoff))
            .collect();
        // None sorts first: never-fetched records are the oldest
        stale.sort_by(|a, b| a.last_update.cmp(&b.last_update).then_with(|| a.key.cmp(&b.key)));
        Ok(stale.into_iter().take(limit).cloned().collect())
    }
}
