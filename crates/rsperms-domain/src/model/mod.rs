//! Permission model: nodes, identifiers and permission holders.

mod context;
mod group;
mod identifier;
mod node;
mod node_set;
mod user;

#[cfg(test)]
mod types_proptest;

pub use context::QueryContext;
pub use group::Group;
pub use identifier::UserIdentifier;
pub use node::{Node, NodeBuilder, GROUP_NODE_PREFIX};
pub use node_set::NodeSet;
pub use user::{User, UserSnapshot};
