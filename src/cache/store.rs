//! Cache Store Module
//!
//! Byte-bounded store combining HashMap storage with LRU tracking and lazy expiration.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{ByteView, CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Capacity-limited key/value store with LRU eviction.
///
/// The store itself is not synchronized; `Group` wraps it in a mutex so the
/// recency order and byte accounting change atomically.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Byte capacity, 0 = unbounded
    max_bytes: u64,
    /// Bytes currently charged
    used_bytes: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_bytes` of keys and values.
    ///
    /// A capacity of 0 disables eviction.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_bytes,
            used_bytes: 0,
        }
    }

    // == Get ==
    /// Retrieves a value by key and marks it most recently used.
    ///
    /// Expired entries are removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<ByteView> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.lru.touch(key);
        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Add ==
    /// Inserts or overwrites a value without expiration.
    pub fn add(&mut self, key: &str, value: ByteView) {
        self.insert(key, CacheEntry::new(value, None));
    }

    /// Inserts or overwrites a value that expires at `expires_at`.
    pub fn add_with_expiration(&mut self, key: &str, value: ByteView, expires_at: DateTime<Utc>) {
        self.insert(key, CacheEntry::new(value, Some(expires_at)));
    }

    fn insert(&mut self, key: &str, entry: CacheEntry) {
        let charge = entry.charge(key);
        if let Some(old) = self.entries.insert(key.to_string(), entry) {
            self.used_bytes -= old.charge(key);
        }
        self.used_bytes += charge;
        self.lru.touch(key);

        self.evict_to_capacity();
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            used_bytes: self.used_bytes,
            max_bytes: self.max_bytes,
            ..self.stats.clone()
        }
    }

    /// Returns the bytes currently charged against the capacity.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    // == Length ==
    /// Returns the number of resident entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts least recently used entries until the byte budget holds.
    ///
    /// The most recent insertion is evicted last, and only when it alone
    /// exceeds the capacity.
    fn evict_to_capacity(&mut self) {
        if self.max_bytes == 0 {
            return;
        }

        while self.used_bytes > self.max_bytes {
            let Some(key) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.used_bytes -= entry.charge(&key);
                self.stats.record_eviction();
                debug!(key = %key, used_bytes = self.used_bytes, "evicted cache entry");
            }
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.used_bytes -= entry.charge(key);
        Some(entry)
    }
}
