//! UserDataStore trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// A stored permission node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNode {
    pub permission: String,
    pub value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<String>,
    /// Expiry as unix seconds; absent for permanent nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl StoredNode {
    /// Creates an unscoped, permanent node.
    pub fn new(permission: impl Into<String>, value: bool) -> Self {
        Self {
            permission: permission.into(),
            value,
            server: None,
            world: None,
            expiry: None,
        }
    }
}

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub uuid: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub primary_group: Option<String>,
    #[serde(default)]
    pub nodes: Vec<StoredNode>,
}

impl StoredUser {
    /// Creates a record with no name, primary group or nodes.
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            name: None,
            primary_group: None,
            nodes: Vec::new(),
        }
    }
}

/// Validates a user record before it is written.
pub fn validate_user(user: &StoredUser) -> StorageResult<()> {
    for node in &user.nodes {
        if node.permission.trim().is_empty() {
            return Err(StorageError::InvalidInput {
                message: format!("user {} has a node with an empty permission", user.uuid),
            });
        }
    }
    if user
        .primary_group
        .as_deref()
        .is_some_and(|group| group.trim().is_empty())
    {
        return Err(StorageError::InvalidInput {
            message: format!("user {} has an empty primary group", user.uuid),
        });
    }
    Ok(())
}

/// Abstract storage interface for user records.
///
/// Implementations must be thread-safe (Send + Sync) and support
/// async operations.
#[async_trait]
pub trait UserDataStore: Send + Sync + 'static {
    /// Writes a user record, replacing any previous one.
    async fn save_user(&self, user: StoredUser) -> StorageResult<()>;

    /// Reads a user record. Returns `None` if no record exists.
    async fn load_user(&self, uuid: Uuid) -> StorageResult<Option<StoredUser>>;

    /// Deletes a user record.
    async fn delete_user(&self, uuid: Uuid) -> StorageResult<()>;

    /// Lists the ids of every stored user.
    async fn list_user_ids(&self) -> StorageResult<Vec<Uuid>>;
}
