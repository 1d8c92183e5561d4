//! Group Statistics Module
//!
//! Counters describing how a group served its gets.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Snapshot of a group's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    /// Get calls with a valid key
    pub gets: u64,
    /// Loads actually executed after deduplication
    pub loads: u64,
    /// Gets answered from the local store
    pub cache_hits: u64,
    /// Loads answered by a remote peer
    pub peer_loads: u64,
    /// Remote gets that failed and fell back to the loader
    pub peer_errors: u64,
    /// Values produced by the local loader
    pub local_loads: u64,
    /// Loader calls that found nothing
    pub loader_misses: u64,
}

impl GroupStats {
    /// Gets that were folded into another caller's load.
    pub fn deduplicated(&self) -> u64 {
        self.gets.saturating_sub(self.loads)
    }
}

#[derive(Debug, Default)]
pub(crate) struct GroupCounters {
    pub gets: AtomicU64,
    pub loads: AtomicU64,
    pub cache_hits: AtomicU64,
    pub peer_loads: AtomicU64,
    pub peer_errors: AtomicU64,
    pub local_loads: AtomicU64,
    pub loader_misses: AtomicU64,
}

impl GroupCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> GroupStats {
        GroupStats {
            gets: self.gets.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            loader_misses: self.loader_misses.load(Ordering::Relaxed),
        }
    }
}
