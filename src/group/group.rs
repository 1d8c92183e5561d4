//! Cache Group Module
//!
//! A named cache namespace tying together the local store, request
//! deduplication, peer routing and the origin loader.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, CacheStore};
use crate::error::{CacheError, Result};
use crate::flight::Flight;
use crate::group::stats::{GroupCounters, GroupStats};
use crate::group::{Loader, Peer, PeerPick, PeerPicker};

// == Group ==
/// A named cache namespace.
///
/// `get` consults the owning peer when one is configured and falls back to
/// the local store and loader. Concurrent gets for the same key share one load.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    store: Mutex<CacheStore>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    flight: Flight<Result<ByteView>>,
    /// Loads that never consult peers; kept apart so they cannot join a
    /// routed load that is waiting on a peer
    local_flight: Flight<Result<ByteView>>,
    counters: GroupCounters,
}

impl Group {
    // == Builder ==
    /// Starts building a group called `name`.
    pub fn builder(name: impl Into<String>) -> GroupBuilder {
        GroupBuilder::new(name)
    }

    pub(crate) fn new(name: String, cache_bytes: u64, loader: Arc<dyn Loader>) -> Self {
        Self {
            name,
            loader,
            store: Mutex::new(CacheStore::new(cache_bytes)),
            peers: OnceLock::new(),
            flight: Flight::new(),
            local_flight: Flight::new(),
            counters: GroupCounters::default(),
        }
    }

    /// Returns the group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Register Peers ==
    /// Wires the peer picker used to route keys to their owners.
    ///
    /// Peers can be registered once per group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.peers.set(peers).map_err(|_| {
            CacheError::MisconfiguredGroup(format!(
                "peers registered more than once for group {}",
                self.name
            ))
        })
    }

    // == Get ==
    /// Returns the value for `key`.
    ///
    /// Fails with `InvalidKey` for an empty key and `NotFound` when neither a
    /// peer nor the loader can produce the value.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        GroupCounters::incr(&self.counters.gets);

        self.flight.work(key, || self.load(key)).await
    }

    /// Returns the value for `key` from the local store or loader, never
    /// asking a peer.
    ///
    /// Used to answer requests forwarded by another member, which may see a
    /// different ring than this one.
    pub async fn get_local(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        GroupCounters::incr(&self.counters.gets);

        self.local_flight
            .work(key, || async move {
                GroupCounters::incr(&self.counters.loads);
                self.get_locally(key).await
            })
            .await
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        GroupCounters::incr(&self.counters.loads);

        if let PeerPick::Remote(peer) = self.pick_peer(key) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    GroupCounters::incr(&self.counters.peer_loads);
                    return Ok(value);
                }
                Err(err) => {
                    GroupCounters::incr(&self.counters.peer_errors);
                    warn!(group = %self.name, key, error = %err, "failed to get from peer, loading locally");
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn Peer, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::from(bytes))
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let cached = self.store.lock().get(key);
        if let Some(value) = cached {
            GroupCounters::incr(&self.counters.cache_hits);
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        let Some(loaded) = self.loader.load(key).await else {
            GroupCounters::incr(&self.counters.loader_misses);
            return Err(CacheError::NotFound(key.to_string()));
        };
        GroupCounters::incr(&self.counters.local_loads);

        let value = ByteView::from(loaded.bytes);
        let mut store = self.store.lock();
        match loaded.expires_at {
            Some(expires_at) => store.add_with_expiration(key, value.clone(), expires_at),
            None => store.add(key, value.clone()),
        }
        debug!(group = %self.name, key, bytes = value.len(), "loaded from origin");
        Ok(value)
    }

    // == Delete ==
    /// Deletes `key` from the store of whichever member owns it.
    ///
    /// Remote failures are returned as-is; nothing is deleted locally for a
    /// key owned by another member.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        if self.peers.get().is_none() {
            return Ok(self.delete_locally(key));
        }

        match self.pick_peer(key) {
            PeerPick::Unknown => Ok(false),
            PeerPick::Local => Ok(self.delete_locally(key)),
            PeerPick::Remote(peer) => peer.delete(&self.name, key).await,
        }
    }

    /// Deletes `key` from the local store only.
    pub fn delete_local(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }
        Ok(self.delete_locally(key))
    }

    fn delete_locally(&self, key: &str) -> bool {
        let removed = self.store.lock().delete(key);
        debug!(group = %self.name, key, removed, "deleted locally");
        removed
    }

    fn pick_peer(&self, key: &str) -> PeerPick {
        match self.peers.get() {
            Some(peers) => peers.pick_peer(key),
            None => PeerPick::Local,
        }
    }

    // == Stats ==
    /// Returns the group's get/load counters.
    pub fn stats(&self) -> GroupStats {
        self.counters.snapshot()
    }

    /// Returns the local store's statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Drops expired entries from the local store, returning how many.
    pub fn purge_expired(&self) -> usize {
        self.store.lock().purge_expired()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}

// == Group Builder ==
/// Validating constructor for [`Group`].
pub struct GroupBuilder {
    name: String,
    cache_bytes: u64,
    loader: Option<Arc<dyn Loader>>,
    peers: Option<Arc<dyn PeerPicker>>,
}

impl GroupBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache_bytes: 0,
            loader: None,
            peers: None,
        }
    }

    /// Byte capacity of the local store, 0 = unbounded.
    pub fn cache_bytes(mut self, cache_bytes: u64) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn loader(mut self, loader: impl Loader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn shared_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn peers(mut self, peers: Arc<dyn PeerPicker>) -> Self {
        self.peers = Some(peers);
        self
    }

    /// Returns the group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Build ==
    /// Builds the group, failing with `MisconfiguredGroup` if no loader was set.
    pub fn build(self) -> Result<Group> {
        let loader = self.loader.ok_or_else(|| {
            CacheError::MisconfiguredGroup(format!("group {} has no loader", self.name))
        })?;

        let group = Group::new(self.name, self.cache_bytes, loader);
        if let Some(peers) = self.peers {
            group.register_peers(peers)?;
        }
        Ok(group)
    }
}
