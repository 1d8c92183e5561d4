//! Response DTOs for the peer transport
//!
//! Defines the structure of HTTP response bodies exchanged between peers.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::group::GroupStats;

/// Response body for a remote delete (DELETE {base}/:group/:key)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Group the key belongs to
    pub group: String,
    /// The key that was targeted
    pub key: String,
    /// Whether an entry was removed
    pub removed: bool,
}

impl DeleteResponse {
    pub fn new(group: impl Into<String>, key: impl Into<String>, removed: bool) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats/:group)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Group name
    pub group: String,
    /// Get and load counters
    pub group_stats: GroupStats,
    /// Local store counters
    pub cache_stats: CacheStats,
    /// Local store hit rate
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(group: impl Into<String>, group_stats: GroupStats, cache_stats: CacheStats) -> Self {
        let hit_rate = cache_stats.hit_rate();
        Self {
            group: group.into(),
            group_stats,
            cache_stats,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Number of registered groups
    pub groups: usize,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(groups: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            groups,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}
