//! Group Module
//!
//! Named cache namespaces, their registry, and the loader and peer contracts
//! they depend on.

#[allow(clippy::module_inception)]
mod group;
mod loader;
mod peers;
mod registry;
mod stats;

pub use group::{Group, GroupBuilder};
pub use loader::{Loaded, Loader, LoaderFn};
pub use peers::{Peer, PeerDeleter, PeerGetter, PeerPick, PeerPicker};
pub use registry::GroupRegistry;
pub use stats::GroupStats;
