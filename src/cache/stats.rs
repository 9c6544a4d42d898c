//! Volatile Tier Statistics
//!
//! Tracks hit, miss, eviction and refusal counts of the volatile tier.

use serde::Serialize;

// == Volatile Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct VolatileStats {
    /// Reads answered by the volatile tier
    pub hits: u64,
    /// Reads that fell through (absent or expired)
    pub misses: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Writes refused (oversized record or key)
    pub rejected: u64,
    /// Current number of entries
    pub total_entries: usize,
}

impl VolatileStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
