//! Node sets keyed by normalized node representation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::Node;
use crate::error::{DomainError, DomainResult};

/// A set of nodes, unique by [`Node::key`].
///
/// Nodes are never mutated in place: setting a node with an existing key
/// replaces the stored node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: BTreeMap<String, Node>,
}

impl NodeSet {
    /// Creates an empty node set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes in the set.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the set holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Adds a node.
    ///
    /// Fails with [`DomainError::NodeAlreadyPresent`] if a node with the same
    /// key and value is already held. A node with the same key but a
    /// different value is replaced.
    pub fn insert(&mut self, node: Node) -> DomainResult<()> {
        let key = node.key();
        if let Some(existing) = self.nodes.get(&key) {
            if existing.value() == node.value() {
                return Err(DomainError::NodeAlreadyPresent { key });
            }
        }
        self.nodes.insert(key, node);
        Ok(())
    }

    /// Removes the node occupying `node`'s key, regardless of value.
    pub fn remove(&mut self, node: &Node) -> DomainResult<Node> {
        let key = node.key();
        self.nodes
            .remove(&key)
            .ok_or(DomainError::NodeNotPresent { key })
    }

    /// Returns true if a node with the same key and value is held.
    pub fn contains(&self, node: &Node) -> bool {
        self.nodes
            .get(&node.key())
            .is_some_and(|existing| existing.value() == node.value())
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Drops temporary nodes whose expiry has passed, returning how many
    /// were removed.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| !node.has_expired(now));
        before - self.nodes.len()
    }

    /// Copies the nodes out in key order.
    pub fn to_vec(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }
}

impl FromIterator<Node> for NodeSet {
    /// Later nodes replace earlier nodes with the same key.
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(|node| (node.key(), node)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn node(permission: &str) -> Node {
        Node::builder(permission).build().unwrap()
    }

    #[test]
    fn test_insert_rejects_identical_node() {
        let mut set = NodeSet::new();
        set.insert(node("a.b")).unwrap();

        let result = set.insert(node("A.B"));
        assert!(matches!(result, Err(DomainError::NodeAlreadyPresent { .. })));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_insert_with_other_value_replaces() {
        let mut set = NodeSet::new();
        set.insert(node("a.b")).unwrap();
        set.insert(Node::builder("a.b").value(false).build().unwrap())
            .unwrap();

        assert_eq!(set.len(), 1);
        assert!(!set.iter().next().unwrap().value());
    }

    #[test]
    fn test_remove_ignores_value() {
        let mut set: NodeSet = [node("a.b"), node("c.d")].into_iter().collect();
        let removed = set
            .remove(&Node::builder("a.b").value(false).build().unwrap())
            .unwrap();
        assert_eq!(removed, node("a.b"));
        assert_eq!(set.len(), 1);

        let result = set.remove(&node("a.b"));
        assert!(matches!(result, Err(DomainError::NodeNotPresent { .. })));
    }

    #[test]
    fn test_remove_expired() {
        let now = Utc::now();
        let mut set: NodeSet = [
            node("a.b"),
            Node::builder("c.d")
                .expiry(now - Duration::minutes(5))
                .build()
                .unwrap(),
            Node::builder("e.f")
                .expiry(now + Duration::minutes(5))
                .build()
                .unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.remove_expired(now), 1);
        assert_eq!(set.len(), 2);
        assert_eq!(set.remove_expired(now), 0);
    }

    #[test]
    fn test_contains_compares_value() {
        let set: NodeSet = [node("a.b")].into_iter().collect();
        assert!(set.contains(&node("a.b")));
        assert!(!set.contains(&Node::builder("a.b").value(false).build().unwrap()));
    }
}
