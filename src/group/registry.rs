//! Group Registry Module
//!
//! Directory of named groups shared by the application and the transport.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::Result;
use crate::group::{Group, GroupBuilder, Loader};

// == Group Registry ==
/// Name -> group directory.
///
/// Lookups take a shared lock; creation and destruction take it exclusively.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == New Group ==
    /// Creates a group and registers it under `name`, replacing any group
    /// already registered with that name.
    pub fn new_group(
        &self,
        name: impl Into<String>,
        cache_bytes: u64,
        loader: impl Loader + 'static,
    ) -> Arc<Group> {
        let group = Group::new(name.into(), cache_bytes, Arc::new(loader));
        self.insert(group)
    }

    /// Builds a group from `builder` and registers it, replacing any group
    /// already registered with the same name.
    pub fn register(&self, builder: GroupBuilder) -> Result<Arc<Group>> {
        let group = builder.build()?;
        Ok(self.insert(group))
    }

    fn insert(&self, group: Group) -> Arc<Group> {
        let group = Arc::new(group);
        let replaced = self
            .groups
            .write()
            .insert(group.name().to_string(), group.clone())
            .is_some();
        info!(group = %group.name(), replaced, "registered group");
        group
    }

    // == Get Group ==
    /// Returns the group registered under `name`.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    // == Destroy Group ==
    /// Unregisters `name`, returning the removed group. Unknown names are ignored.
    pub fn destroy_group(&self, name: &str) -> Option<Arc<Group>> {
        let removed = self.groups.write().remove(name);
        if removed.is_some() {
            info!(group = %name, "destroyed group");
        }
        removed
    }

    /// Returns every registered group.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        self.groups.read().values().cloned().collect()
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}
