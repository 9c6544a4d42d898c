//! Cache Module
//!
//! Cache records, the freshness policy, and the durable/volatile stores
//! that hold them.

mod durable;
mod entry;
mod freshness;
mod lru;
mod record;
mod report;
mod stats;
mod store;
mod tiered;


// Re-export public types
pub use durable::{DurableStore, MemoryStore, StoreError};
pub use entry::VolatileEntry;
pub use freshness::{is_stale, FreshnessPolicy, DEFAULT_STALE_AFTER};
pub(crate) use lru::LruTracker;
pub use record::CacheRecord;
pub use report::{gather_player_stats, list_stale_players, PlayerStats, StalePlayer};
pub use stats::VolatileStats;
pub use store::{BestEffort, MemoryVolatileStore, VolatileCache, VolatileStore, WarmError};
pub use tiered::ProfileStore;

// == Public Constants ==
/// Maximum key length accepted by the volatile tier, in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum record size accepted by the volatile tier, in bytes
pub const MAX_RECORD_SIZE: usize = 1024 * 1024; // 1 MB
