//! Permission nodes.
//!
//! A node is a single immutable grant: a permission string with a value,
//! optionally scoped to a server, a world or a time window. Nodes whose
//! permission is `group.<name>` grant membership in a group rather than a
//! plain permission.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QueryContext;
use crate::error::{DomainError, DomainResult};

/// Prefix marking a group-membership node.
pub const GROUP_NODE_PREFIX: &str = "group.";

/// An immutable permission grant.
///
/// Equality compares every field. Two nodes that differ only in value share
/// the same [`Node::key`] and therefore occupy the same slot in a
/// [`NodeSet`](super::NodeSet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
    permission: String,
    value: bool,
    server: Option<String>,
    world: Option<String>,
    expiry: Option<DateTime<Utc>>,
}

impl Node {
    /// Starts building a node for the given permission. The value defaults
    /// to `true`.
    pub fn builder(permission: impl Into<String>) -> NodeBuilder {
        NodeBuilder {
            permission: permission.into(),
            value: true,
            server: None,
            world: None,
            expiry: None,
        }
    }

    /// Builds an unscoped, permanent node granting membership in `group`.
    pub fn group(group: &str) -> DomainResult<Self> {
        let group = group.trim();
        if group.is_empty() {
            return Err(DomainError::InvalidNode {
                message: "group name cannot be empty".to_string(),
            });
        }
        Self::builder(format!("{GROUP_NODE_PREFIX}{}", group.to_lowercase())).build()
    }

    /// Returns the permission string.
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Returns the value of the grant.
    pub fn value(&self) -> bool {
        self.value
    }

    /// Returns true if this node grants membership in a group.
    pub fn is_group_node(&self) -> bool {
        self.permission.len() > GROUP_NODE_PREFIX.len()
            && self
                .permission
                .get(..GROUP_NODE_PREFIX.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(GROUP_NODE_PREFIX))
    }

    /// Returns the lowercased name of the referenced group, for group nodes.
    pub fn group_name(&self) -> Option<String> {
        if !self.is_group_node() {
            return None;
        }
        self.permission
            .get(GROUP_NODE_PREFIX.len()..)
            .map(str::to_lowercase)
    }

    /// Returns true if this node expires.
    pub fn is_temporary(&self) -> bool {
        self.expiry.is_some()
    }

    /// Returns the expiry instant of a temporary node.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Returns the server this node is restricted to.
    pub fn server_context(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Returns the world this node is restricted to.
    pub fn world_context(&self) -> Option<&str> {
        self.world.as_deref()
    }

    /// Returns true if this node is restricted to a server.
    pub fn is_server_specific(&self) -> bool {
        self.server.is_some()
    }

    /// Returns true if this node is restricted to a world.
    pub fn is_world_specific(&self) -> bool {
        self.world.is_some()
    }

    /// Returns true if this node is temporary and its expiry has passed.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| expiry <= now)
    }

    /// Returns true if this node takes effect in the given context.
    pub fn applies_to(&self, ctx: &QueryContext) -> bool {
        !self.has_expired(ctx.now)
            && scope_matches(self.server.as_deref(), ctx.server.as_deref())
            && scope_matches(self.world.as_deref(), ctx.world.as_deref())
    }

    /// Returns true if this node grants or denies `permission`
    /// (case-insensitive).
    pub fn matches_permission(&self, permission: &str) -> bool {
        self.permission.eq_ignore_ascii_case(permission)
    }

    /// Normalized representation identifying the grant slot.
    ///
    /// Format: `[server[-world]/]permission[$expiry]`, lowercased, with a
    /// world-only scope written as `global-world/`. The value is not part of
    /// the key.
    pub fn key(&self) -> String {
        let mut key = String::with_capacity(self.permission.len() + 16);
        match (&self.server, &self.world) {
            (Some(server), Some(world)) => {
                key.push_str(&server.to_lowercase());
                key.push('-');
                key.push_str(&world.to_lowercase());
                key.push('/');
            }
            (Some(server), None) => {
                key.push_str(&server.to_lowercase());
                key.push('/');
            }
            (None, Some(world)) => {
                key.push_str("global-");
                key.push_str(&world.to_lowercase());
                key.push('/');
            }
            (None, None) => {}
        }
        key.push_str(&self.permission.to_lowercase());
        if let Some(expiry) = self.expiry {
            key.push('$');
            key.push_str(&expiry.timestamp().to_string());
        }
        key
    }
}

fn scope_matches(scope: Option<&str>, actual: Option<&str>) -> bool {
    match scope {
        None => true,
        Some(scope) => actual.is_some_and(|actual| actual.eq_ignore_ascii_case(scope)),
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key(), self.value)
    }
}

/// Builder for [`Node`].
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    permission: String,
    value: bool,
    server: Option<String>,
    world: Option<String>,
    expiry: Option<DateTime<Utc>>,
}

impl NodeBuilder {
    /// Sets the value of the grant.
    pub fn value(mut self, value: bool) -> Self {
        self.value = value;
        self
    }

    /// Restricts the node to a server.
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Restricts the node to a world.
    pub fn world(mut self, world: impl Into<String>) -> Self {
        self.world = Some(world.into());
        self
    }

    /// Makes the node temporary, expiring at `expiry`.
    pub fn expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Builds the node.
    ///
    /// Surrounding whitespace is trimmed from the permission and scopes.
    /// Empty scopes are treated as absent.
    pub fn build(self) -> DomainResult<Node> {
        let permission = self.permission.trim().to_string();
        if permission.is_empty() {
            return Err(DomainError::InvalidNode {
                message: "permission cannot be empty".to_string(),
            });
        }
        if permission.contains(char::is_whitespace) {
            return Err(DomainError::InvalidNode {
                message: format!("permission cannot contain whitespace: '{permission}'"),
            });
        }

        Ok(Node {
            permission,
            value: self.value,
            server: normalize_scope(self.server),
            world: normalize_scope(self.world),
            expiry: self.expiry,
        })
    }
}

fn normalize_scope(scope: Option<String>) -> Option<String> {
    scope
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Wire shape used to validate deserialized nodes through the builder.
#[derive(Deserialize)]
struct RawNode {
    permission: String,
    value: bool,
    #[serde(default)]
    server: Option<String>,
    #[serde(default)]
    world: Option<String>,
    #[serde(default)]
    expiry: Option<DateTime<Utc>>,
}

impl TryFrom<RawNode> for Node {
    type Error = DomainError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let mut builder = Node::builder(raw.permission).value(raw.value);
        if let Some(server) = raw.server {
            builder = builder.server(server);
        }
        if let Some(world) = raw.world {
            builder = builder.world(world);
        }
        if let Some(expiry) = raw.expiry {
            builder = builder.expiry(expiry);
        }
        builder.build()
    }
}
