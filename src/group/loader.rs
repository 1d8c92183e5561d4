//! Loader Module
//!
//! The origin a group falls back to when a key is not cached.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

// == Loaded ==
/// A value produced by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// Raw bytes of the value
    pub bytes: Vec<u8>,
    /// Absolute expiration time, None = keep until evicted
    pub expires_at: Option<DateTime<Utc>>,
}

impl Loaded {
    /// A value that never expires.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            expires_at: None,
        }
    }

    /// A value that expires at `expires_at`.
    pub fn expiring(bytes: impl Into<Vec<u8>>, expires_at: DateTime<Utc>) -> Self {
        Self {
            bytes: bytes.into(),
            expires_at: Some(expires_at),
        }
    }
}

// == Loader ==
/// Loads data for a key on a cache miss.
///
/// Implementations may be called from many tasks at once, but at most once
/// per outstanding miss of a given key.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Returns the value for `key`, or None if the origin has no such key.
    async fn load(&self, key: &str) -> Option<Loaded>;
}

/// Adapts a plain function or closure into a [`Loader`].
pub struct LoaderFn<F>(pub F);

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> Option<Loaded> + Send + Sync,
{
    async fn load(&self, key: &str) -> Option<Loaded> {
        (self.0)(key)
    }
}
