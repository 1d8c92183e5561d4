//! Cache Module
//!
//! Provides the byte-bounded local store with LRU eviction and lazy expiration.

mod byteview;
mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use byteview::ByteView;
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;
