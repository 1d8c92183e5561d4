//! Consistent Hash Ring Module
//!
//! Maps keys to owning members through a sorted ring of virtual nodes.
//!
//! Each member contributes `replicas` virtual nodes whose positions are the
//! hash of `"{index}{member}"`. A key is owned by the first virtual node
//! clockwise from the key's own hash, wrapping to the start of the ring.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::DEFAULT_REPLICAS;

/// Hash function used to place keys and virtual nodes on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

// == Hash Ring ==
/// Consistent hash ring with virtual nodes.
///
/// The ring holds no locks of its own. Callers that change membership while
/// other tasks look keys up must wrap it (see `transport::HttpPool`).
#[derive(Clone)]
pub struct HashRing {
    /// Hash function for keys and virtual nodes
    hash: HashFn,
    /// Virtual nodes per member
    replicas: usize,
    /// Virtual node positions, sorted ascending
    ring: Vec<u32>,
    /// Virtual node position -> member
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring using CRC-32 (IEEE) and the default replica count.
    pub fn new() -> Self {
        Self {
            hash: Arc::new(crc32fast::hash),
            replicas: DEFAULT_REPLICAS,
            ring: Vec::new(),
            owners: HashMap::new(),
        }
    }

    /// Sets the number of virtual nodes generated per member.
    ///
    /// Must be called before members are added; `remove` recomputes positions
    /// from the current replica count.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Replaces the hash function.
    pub fn with_hash<F>(mut self, hash: F) -> Self
    where
        F: Fn(&[u8]) -> u32 + Send + Sync + 'static,
    {
        self.hash = Arc::new(hash);
        self
    }

    // == Add ==
    /// Adds members to the ring.
    ///
    /// Adding the same member twice duplicates its virtual nodes.
    pub fn add<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for member in members {
            let member = member.as_ref();
            for index in 0..self.replicas {
                let position = self.virtual_node(index, member);
                self.ring.push(position);
                self.owners.insert(position, member.to_string());
            }
        }
        self.ring.sort_unstable();
    }

    // == Get ==
    /// Returns the member owning `key`, or None if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.ring.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.ring.partition_point(|&position| position < hash);
        let position = self.ring[idx % self.ring.len()];
        self.owners.get(&position).map(String::as_str)
    }

    // == Remove ==
    /// Removes a member's virtual nodes.
    ///
    /// Positions are recomputed from the member name. A position that is not
    /// on the ring is skipped.
    pub fn remove(&mut self, member: &str) {
        for index in 0..self.replicas {
            let position = self.virtual_node(index, member);
            if let Ok(idx) = self.ring.binary_search(&position) {
                self.ring.remove(idx);
                // A member added twice still owns the remaining copy.
                if self.ring.binary_search(&position).is_err() {
                    self.owners.remove(&position);
                }
            }
        }
    }

    // == Length ==
    /// Returns the number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns the distinct members currently on the ring, sorted.
    pub fn members(&self) -> Vec<String> {
        let mut members: Vec<String> = self.owners.values().cloned().collect();
        members.sort();
        members.dedup();
        members
    }

    fn virtual_node(&self, index: usize, member: &str) -> u32 {
        (self.hash)(format!("{index}{member}").as_bytes())
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.ring.len())
            .field("members", &self.members())
            .finish()
    }
}
