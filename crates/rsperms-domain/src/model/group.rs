//! The group entity.
//!
//! Groups are loaded and stored elsewhere; this crate only consumes them to
//! resolve inherited permissions. Parent groups are referenced by name
//! through group nodes, never by pointer.

use std::sync::{PoisonError, RwLock};

use super::{Node, NodeSet};
use crate::error::DomainResult;

/// A named permission holder whose nodes are inherited by its members.
#[derive(Debug)]
pub struct Group {
    name: String,
    nodes: RwLock<NodeSet>,
}

impl Group {
    /// Creates an empty group. Group names are case-insensitive and stored
    /// lowercased.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            nodes: RwLock::new(NodeSet::new()),
        }
    }

    /// Returns the lowercased name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every node.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .to_vec()
    }

    /// Adds a node. See [`NodeSet::insert`].
    pub fn set_permission(&self, node: Node) -> DomainResult<()> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node)
    }

    /// Removes a node. See [`NodeSet::remove`].
    pub fn unset_permission(&self, node: &Node) -> DomainResult<()> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(node)
            .map(|_| ())
    }

    /// Replaces every node at once.
    pub fn replace_nodes(&self, nodes: impl IntoIterator<Item = Node>) {
        let nodes: NodeSet = nodes.into_iter().collect();
        *self.nodes.write().unwrap_or_else(PoisonError::into_inner) = nodes;
    }
}
