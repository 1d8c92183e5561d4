//! Peercache - A distributed read-through byte cache
//!
//! Each process holds a bounded local store; cooperating processes split the
//! keyspace with a consistent hash ring. A miss on the owning process runs a
//! user-supplied loader, a miss elsewhere is forwarded to the owner, and
//! concurrent identical gets are collapsed into one load.

pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod models;
pub mod origin;
pub mod ring;
pub mod tasks;
pub mod transport;

pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Group, GroupBuilder, GroupRegistry, Loaded, Loader, LoaderFn, PeerPick, PeerPicker};
pub use ring::HashRing;
pub use tasks::spawn_purge_task;
pub use transport::{create_router, AppState, HttpPool};
