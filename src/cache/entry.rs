//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expiration support.

use chrono::{DateTime, Utc};

use crate::cache::ByteView;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: ByteView,
    /// Absolute expiration time, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with an optional absolute expiration time.
    pub fn new(value: ByteView, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now` reaches its expiration time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Size ==
    /// Bytes charged against the store capacity for this entry under `key`.
    pub fn charge(&self, key: &str) -> u64 {
        (key.len() + self.value.len()) as u64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_entry_no_expiration() {
        let entry = CacheEntry::new(ByteView::from("v"), None);
        assert!(!entry.is_expired_at(Utc::now()));
        assert!(!entry.is_expired_at(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn test_entry_expiration_boundary() {
        let at = Utc::now() + Duration::seconds(10);
        let entry = CacheEntry::new(ByteView::from("v"), Some(at));

        assert!(!entry.is_expired_at(at - Duration::milliseconds(1)));
        assert!(entry.is_expired_at(at), "Entry should be expired at boundary");
        assert!(entry.is_expired_at(at + Duration::milliseconds(1)));
    }

    #[test]
    fn test_entry_charge_counts_key_and_value() {
        let entry = CacheEntry::new(ByteView::from("value"), None);
        assert_eq!(entry.charge("key"), 8);
    }
}
