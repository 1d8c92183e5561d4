//! Transport Module
//!
//! HTTP implementation of the peer boundary: a ring-backed peer picker, a
//! client for remote gets and deletes, and the router that serves them.

mod client;
pub mod handlers;
mod pool;
pub mod routes;

pub use client::HttpPeer;
pub use handlers::{AppState, FORWARDED_HEADER};
pub use pool::{HttpPool, DEFAULT_BASE_PATH};
pub use routes::{create_router, create_router_with_base};
