//! In-memory storage implementation.
//!
//! Records live in a `DashMap` keyed by user id, so concurrent saves and
//! loads of different users never contend on a shared lock.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::traits::{validate_user, StoredUser, UserDataStore};

/// In-memory implementation of UserDataStore.
#[derive(Debug, Default)]
pub struct MemoryUserDataStore {
    users: DashMap<Uuid, StoredUser>,
}

impl MemoryUserDataStore {
    /// Creates a new in-memory data store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory data store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDataStore for MemoryUserDataStore {
    #[instrument(skip(self, user), fields(user = %user.uuid))]
    async fn save_user(&self, user: StoredUser) -> StorageResult<()> {
        validate_user(&user)?;
        debug!(nodes = user.nodes.len(), "storing user record");
        self.users.insert(user.uuid, user);
        Ok(())
    }

    async fn load_user(&self, uuid: Uuid) -> StorageResult<Option<StoredUser>> {
        Ok(self.users.get(&uuid).map(|entry| entry.value().clone()))
    }

    async fn delete_user(&self, uuid: Uuid) -> StorageResult<()> {
        if self.users.remove(&uuid).is_none() {
            return Err(StorageError::UserNotFound {
                uuid: uuid.to_string(),
            });
        }
        Ok(())
    }

    async fn list_user_ids(&self) -> StorageResult<Vec<Uuid>> {
        Ok(self.users.iter().map(|entry| *entry.key()).collect())
    }
}
