//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a node is serving.
//!
//! # Tasks
//! - Expiration purge: drops expired entries from every registered group

mod purge;

pub use purge::spawn_purge_task;
