//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default number of virtual nodes per ring member.
pub const DEFAULT_REPLICAS: usize = 150;

/// Default store capacity in bytes (64 MiB).
pub const DEFAULT_CACHE_BYTES: u64 = 64 * 1024 * 1024;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte capacity of each group's local store (0 = unbounded)
    pub cache_bytes: u64,
    /// Virtual nodes generated per ring member
    pub replicas: usize,
    /// Base URL of this node, also its identity on the ring
    pub self_addr: String,
    /// Base URLs of the other nodes
    pub peers: Vec<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Name of the group served by the node binary
    pub group_name: String,
    /// Directory the node's file loader reads from
    pub data_dir: PathBuf,
    /// Timeout applied to every peer call
    pub peer_timeout: Duration,
    /// Interval between eager expiration sweeps, None = lazy expiration only
    pub purge_interval: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BYTES` - Store capacity in bytes (default: 64 MiB)
    /// - `RING_REPLICAS` - Virtual nodes per member (default: 150)
    /// - `SELF_ADDR` - This node's base URL (default: http://127.0.0.1:8001)
    /// - `PEERS` - Comma-separated peer base URLs (default: none)
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `GROUP_NAME` - Group served by the node (default: "default")
    /// - `DATA_DIR` - Loader origin directory (default: ./data)
    /// - `PEER_TIMEOUT_MS` - Peer call timeout in milliseconds (default: 2000)
    /// - `PURGE_INTERVAL` - Expiration sweep interval in seconds, 0 disables (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let purge_secs: u64 = parse_var("PURGE_INTERVAL").unwrap_or(0);

        Self {
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            replicas: parse_var("RING_REPLICAS").unwrap_or(defaults.replicas),
            self_addr: env::var("SELF_ADDR").unwrap_or(defaults.self_addr),
            peers: env::var("PEERS")
                .map(|v| parse_peer_list(&v))
                .unwrap_or_default(),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            group_name: env::var("GROUP_NAME").unwrap_or(defaults.group_name),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            peer_timeout: parse_var("PEER_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.peer_timeout),
            purge_interval: (purge_secs > 0).then(|| Duration::from_secs(purge_secs)),
        }
    }

    /// Every ring member, self included, without duplicates.
    pub fn members(&self) -> Vec<String> {
        let mut members = vec![self.self_addr.clone()];
        for peer in &self.peers {
            if !members.contains(peer) {
                members.push(peer.clone());
            }
        }
        members
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_bytes: DEFAULT_CACHE_BYTES,
            replicas: DEFAULT_REPLICAS,
            self_addr: "http://127.0.0.1:8001".to_string(),
            peers: Vec::new(),
            server_port: 8001,
            group_name: "default".to_string(),
            data_dir: PathBuf::from("./data"),
            peer_timeout: Duration::from_millis(2000),
            purge_interval: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
