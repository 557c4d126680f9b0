//! Key Index Module
//!
//! Maps keys to the recency list node that holds their entry.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::lru::NodeId;

// == Key Index ==
/// Lookup-only map from key to [`NodeId`].
///
/// The index never owns entries. An id is removed here in the same step
/// its node is unlinked from the recency list.
#[derive(Debug)]
pub struct KeyIndex<K> {
    ids: HashMap<K, NodeId>,
}

impl<K> Default for KeyIndex<K> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> KeyIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.get(key).copied()
    }

    pub fn insert(&mut self, key: K, id: NodeId) {
        self.ids.insert(key, id);
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ids.remove(key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
