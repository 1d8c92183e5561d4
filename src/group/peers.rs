//! Peer Module
//!
//! Capability contracts between a group and the processes that share its keyspace.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// == Peer Getter ==
/// Fetches a value from the peer that owns it.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;
}

// == Peer Deleter ==
/// Deletes a value on the peer that owns it.
#[async_trait]
pub trait PeerDeleter: Send + Sync {
    /// Returns whether the peer removed anything.
    async fn delete(&self, group: &str, key: &str) -> Result<bool>;
}

/// A remote process reachable for both reads and deletes.
pub trait Peer: PeerGetter + PeerDeleter {}

impl<T: PeerGetter + PeerDeleter> Peer for T {}

// == Peer Pick ==
/// Outcome of resolving which member owns a key.
#[derive(Clone)]
pub enum PeerPick {
    /// No member can be determined (for example, an empty ring)
    Unknown,
    /// This process owns the key
    Local,
    /// A remote peer owns the key
    Remote(Arc<dyn Peer>),
}

impl std::fmt::Debug for PeerPick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerPick::Unknown => f.write_str("Unknown"),
            PeerPick::Local => f.write_str("Local"),
            PeerPick::Remote(_) => f.write_str("Remote"),
        }
    }
}

// == Peer Picker ==
/// Resolves the owner of a key.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> PeerPick;
}
