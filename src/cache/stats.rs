//! Cache Statistics Module
//!
//! Tracks store metrics including hits, misses, evictions and byte usage.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of a store's counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups for absent or expired keys
    pub misses: u64,
    /// Number of entries evicted to respect the byte capacity
    pub evictions: u64,
    /// Number of entries dropped because they expired
    pub expirations: u64,
    /// Current number of entries
    pub total_entries: usize,
    /// Bytes currently charged against the capacity
    pub used_bytes: u64,
    /// Byte capacity, 0 = unbounded
    pub max_bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
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

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}
