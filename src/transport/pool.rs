//! HTTP Peer Pool
//!
//! Tracks the set of nodes sharing the keyspace and routes keys to them
//! through a consistent hash ring.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_REPLICAS};
use crate::error::{CacheError, Result};
use crate::group::{PeerPick, PeerPicker};
use crate::ring::HashRing;
use crate::transport::HttpPeer;

/// Path prefix under which nodes serve each other.
pub const DEFAULT_BASE_PATH: &str = "/_peercache";

// == HTTP Pool ==
/// Peer picker for a set of nodes addressed by base URL.
///
/// This node's own address must be one of the members; keys it owns resolve
/// to `PeerPick::Local`.
#[derive(Debug)]
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    client: Client,
    state: RwLock<PoolState>,
}

#[derive(Debug, Default)]
struct PoolState {
    ring: HashRing,
    peers: HashMap<String, Arc<HttpPeer>>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node at `self_addr` with no members.
    ///
    /// Peer calls time out after the default `PEER_TIMEOUT_MS`.
    pub fn new(self_addr: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Config::default().peer_timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build http client, peer calls will not time out");
                Client::new()
            });
        Self::with_client(self_addr, client)
    }

    /// Creates a pool whose peer calls go through `client`.
    pub fn with_client(self_addr: impl Into<String>, client: Client) -> Self {
        Self {
            self_addr: normalize(&self_addr.into()),
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            client,
            state: RwLock::new(PoolState::default()),
        }
    }

    /// Creates a pool from node configuration and adds every configured member.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.peer_timeout)
            .build()
            .map_err(|err| CacheError::Internal(format!("failed to build http client: {err}")))?;

        let pool = Self::with_client(config.self_addr.as_str(), client).with_replicas(config.replicas);
        pool.set_peers(config.members())?;
        Ok(pool)
    }

    /// Sets the virtual nodes per member used by subsequent `set_peers` calls.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Sets the path prefix used to reach peers.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set Peers ==
    /// Replaces the membership with `members`, rebuilding the ring.
    pub fn set_peers<I, S>(&self, members: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ring = HashRing::new().with_replicas(self.replicas);
        let mut peers = HashMap::new();
        for member in members {
            let member = normalize(member.as_ref());
            if peers.contains_key(&member) {
                continue;
            }
            let peer = HttpPeer::new(&member, &self.base_path, self.client.clone())?;
            ring.add([member.as_str()]);
            peers.insert(member, Arc::new(peer));
        }

        info!(self_addr = %self.self_addr, members = peers.len(), "peer set replaced");
        *self.state.write() = PoolState { ring, peers };
        Ok(())
    }

    /// Adds one member to the ring. Known members are ignored.
    pub fn add_peer(&self, member: &str) -> Result<()> {
        let member = normalize(member);
        let peer = HttpPeer::new(&member, &self.base_path, self.client.clone())?;

        let mut state = self.state.write();
        if state.peers.contains_key(&member) {
            return Ok(());
        }
        state.ring.add([member.as_str()]);
        state.peers.insert(member.clone(), Arc::new(peer));
        info!(self_addr = %self.self_addr, peer = %member, "peer added");
        Ok(())
    }

    /// Removes one member from the ring. Unknown members are ignored.
    pub fn remove_peer(&self, member: &str) {
        let member = normalize(member);
        let mut state = self.state.write();
        if state.peers.remove(&member).is_some() {
            state.ring.remove(&member);
            info!(self_addr = %self.self_addr, peer = %member, "peer removed");
        }
    }

    /// Returns the current members, sorted.
    pub fn members(&self) -> Vec<String> {
        self.state.read().ring.members()
    }

    /// Returns the member that owns `key`.
    pub fn owner(&self, key: &str) -> Option<String> {
        self.state.read().ring.get(key).map(str::to_string)
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> PeerPick {
        let state = self.state.read();
        let Some(owner) = state.ring.get(key) else {
            return PeerPick::Unknown;
        };

        if owner == self.self_addr {
            return PeerPick::Local;
        }

        debug!(key, peer = %owner, "picked remote peer");
        match state.peers.get(owner) {
            Some(peer) => PeerPick::Remote(peer.clone()),
            None => PeerPick::Unknown,
        }
    }
}

fn normalize(addr: &str) -> String {
    addr.trim().trim_end_matches('/').to_string()
}
