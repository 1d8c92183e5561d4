//! Transport Handlers
//!
//! HTTP request handlers serving this node's groups to its peers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::{CacheError, Result};
use crate::group::{Group, GroupRegistry};
use crate::models::{DeleteResponse, HealthResponse, StatsResponse};

/// Marks a request sent by another member. Such requests are answered from
/// this node's store and loader and are never forwarded again.
pub const FORWARDED_HEADER: &str = "x-peercache-forwarded";

fn is_forwarded(headers: &HeaderMap) -> bool {
    headers.contains_key(FORWARDED_HEADER)
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: Arc<GroupRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<GroupRegistry>) -> Self {
        Self { registry }
    }

    fn group(&self, name: &str) -> Result<Arc<Group>> {
        self.registry
            .get_group(name)
            .ok_or_else(|| CacheError::NotFound(format!("no such group: {name}")))
    }
}

/// Handler for GET {base}/:group/:key
///
/// Returns the raw value bytes.
pub async fn get_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    let group = state.group(&group)?;
    let value = if is_forwarded(&headers) {
        group.get_local(&key).await?
    } else {
        group.get(&key).await?
    };

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        value.to_bytes(),
    )
        .into_response())
}

/// Handler for DELETE {base}/:group/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((group, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>> {
    let group = state.group(&group)?;
    let removed = if is_forwarded(&headers) {
        group.delete_local(&key)?
    } else {
        group.delete(&key).await?
    };

    Ok(Json(DeleteResponse::new(group.name(), key, removed)))
}

/// Handler for GET /stats/:group
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<StatsResponse>> {
    let group = state.group(&group)?;

    Ok(Json(StatsResponse::new(
        group.name(),
        group.stats(),
        group.cache_stats(),
    )))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.registry.len()))
}
