//! Recency List Module
//!
//! Implements the access ordering used for LRU eviction.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to a node owned by a [`RecencyList`].
    pub struct NodeId;
}

// == Node ==
/// A cached key/value pair threaded into the recency order.
#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    /// Neighbor closer to the front (more recently used)
    prev: Option<NodeId>,
    /// Neighbor closer to the back (less recently used)
    next: Option<NodeId>,
}

// == Recency List ==
/// Doubly linked ordering of entries stored in an arena.
///
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Nodes are owned by the arena and addressed by [`NodeId`], so other
/// structures can refer to a node without borrowing it.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    nodes: SlotMap<NodeId, Node<K, V>>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    // == Push Front ==
    /// Inserts a new entry as the most recently used one.
    pub fn push_front(&mut self, key: K, value: V) -> NodeId {
        let id = self.nodes.insert(Node {
            key,
            value,
            prev: None,
            next: None,
        });
        self.link_front(id);
        id
    }

    // == Move To Front ==
    /// Marks an entry as recently used.
    pub fn move_to_front(&mut self, id: NodeId) {
        if self.head == Some(id) || !self.nodes.contains_key(id) {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    // == Remove ==
    /// Unlinks an entry and hands back its key and value.
    pub fn remove(&mut self, id: NodeId) -> Option<(K, V)> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.unlink(id);
        self.nodes.remove(id).map(|node| (node.key, node.value))
    }

    // == Back ==
    /// Returns the least recently used entry.
    pub fn back(&self) -> Option<NodeId> {
        self.tail
    }

    pub fn key(&self, id: NodeId) -> Option<&K> {
        self.nodes.get(id).map(|node| &node.key)
    }

    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.nodes.get(id).map(|node| &node.value)
    }

    // == Replace Value ==
    /// Swaps in a new value, returning the previous one.
    pub fn replace_value(&mut self, id: NodeId, value: V) -> Option<V> {
        self.nodes
            .get_mut(id)
            .map(|node| std::mem::replace(&mut node.value, value))
    }

    // == Iterate Back To Front ==
    /// Walks the entries from least to most recently used.
    pub fn iter_oldest_first(&self) -> OldestFirst<'_, K, V> {
        OldestFirst {
            list: self,
            cursor: self.tail,
        }
    }

    // == Length ==
    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    // == Clear ==
    /// Drops every entry, returning them from least to most recently used.
    pub fn clear(&mut self) -> Vec<(K, V)> {
        let mut drained = Vec::with_capacity(self.nodes.len());
        while let Some(id) = self.tail {
            match self.remove(id) {
                Some(entry) => drained.push(entry),
                None => break,
            }
        }
        drained
    }

    fn link_front(&mut self, id: NodeId) {
        let old_head = self.head;
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|head| self.nodes.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = match self.nodes.get_mut(id) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }
    }
}

// == Oldest First Iterator ==
/// Iterator over `(NodeId, &K, &V)` from the back of the list to the front.
pub struct OldestFirst<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<NodeId>,
}

impl<'a, K, V> Iterator for OldestFirst<'a, K, V> {
    type Item = (NodeId, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.nodes.get(id)?;
        self.cursor = node.prev;
        Some((id, &node.key, &node.value))
    }
}
