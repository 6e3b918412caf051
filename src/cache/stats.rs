//! Store Statistics Module
//!
//! Tracks store activity: hits, misses, writes and deletes.

use serde::Serialize;

// == Store Stats ==
/// Tracks cache store activity counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Number of lookups that found a live entry
    pub hits: u64,
    /// Number of lookups that found nothing (absent or expired)
    pub misses: u64,
    /// Number of entry writes
    pub stores: u64,
    /// Number of entries removed by delete, pattern-delete or expiry sweep
    pub deletes: u64,
    /// Current number of live entries
    pub total_entries: usize,
}

impl StoreStats {
    // == Constructor ==
    /// Creates a new StoreStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if there were no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Store ==
    pub fn record_store(&mut self) {
        self.stores += 1;
    }

    // == Record Deletes ==
    pub fn record_deletes(&mut self, count: usize) {
        self.deletes += count as u64;
    }

    // == Update Entry Count ==
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
