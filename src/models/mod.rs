//! Response models for the peer transport
//!
//! DTOs serialized by the HTTP handlers and read back by `HttpPeer`.

pub mod responses;

// Re-export commonly used types
pub use responses::{DeleteResponse, ErrorResponse, HealthResponse, StatsResponse};
