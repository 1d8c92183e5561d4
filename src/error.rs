//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for groups, peers and the HTTP transport.
///
/// The type is `Clone` because a single deduplicated load hands the same
/// result to every waiting caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Empty key passed to get or delete
    #[error("key is required")]
    InvalidKey,

    /// Loader could not produce a value for the key
    #[error("data not found: {0}")]
    NotFound(String),

    /// Remote peer call failed
    #[error("peer communication failure: {0}")]
    PeerCommunication(String),

    /// Group was wired incorrectly (missing loader, peers registered twice)
    #[error("misconfigured group: {0}")]
    MisconfiguredGroup(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidKey => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::PeerCommunication(_) => StatusCode::BAD_GATEWAY,
            CacheError::MisconfiguredGroup(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
