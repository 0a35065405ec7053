//! Adapter from the record store to the domain storage seam.
//!
//! The domain asks for users; the store deals in records. This adapter
//! converts between the two and populates the shared user cache on load.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use rsperms_domain::users::UserStorage;
use rsperms_domain::{DomainError, DomainResult, Node, User, UserCache, UserIdentifier, UserSnapshot};
use rsperms_storage::{StorageError, StoredNode, StoredUser, UserDataStore};
use tracing::{debug, instrument};
use uuid::Uuid;

/// [`UserStorage`] backed by a [`UserDataStore`].
pub struct DataStoreUserStorage<S: UserDataStore> {
    store: Arc<S>,
    cache: Arc<UserCache>,
}

impl<S: UserDataStore> DataStoreUserStorage<S> {
    /// Creates an adapter loading into `cache`.
    pub fn new(store: Arc<S>, cache: Arc<UserCache>) -> Self {
        Self { store, cache }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[async_trait]
impl<S: UserDataStore> UserStorage for DataStoreUserStorage<S> {
    #[instrument(skip(self, user), fields(user = %user.unique_id))]
    async fn save_user(&self, user: UserSnapshot) -> DomainResult<()> {
        self.store
            .save_user(stored_from_snapshot(user))
            .await
            .map_err(storage_error)
    }

    /// Loads the record into the cached user, creating it if needed.
    ///
    /// A missing record leaves the user empty. The stored display name wins
    /// over `fallback_name`.
    #[instrument(skip(self))]
    async fn load_user(
        &self,
        unique_id: Uuid,
        fallback_name: Option<&str>,
    ) -> DomainResult<Arc<User>> {
        let record = self
            .store
            .load_user(unique_id)
            .await
            .map_err(storage_error)?;

        // Convert before touching the cache so a corrupt record changes nothing.
        let (name, primary_group, nodes) = match record {
            Some(record) => {
                let nodes = record
                    .nodes
                    .into_iter()
                    .map(node_from_stored)
                    .collect::<DomainResult<Vec<_>>>()?;
                (record.name, record.primary_group, nodes)
            }
            None => {
                debug!("no stored record, starting empty");
                (None, None, Vec::new())
            }
        };

        let user = self.cache.get_or_create(UserIdentifier::of(unique_id));
        let name = name.or_else(|| fallback_name.map(str::to_string));
        user.replace_data(name, primary_group, nodes);
        Ok(user)
    }
}

fn storage_error(err: StorageError) -> DomainError {
    DomainError::Storage {
        message: err.to_string(),
    }
}

/// Converts a snapshot into a record.
pub fn stored_from_snapshot(snapshot: UserSnapshot) -> StoredUser {
    StoredUser {
        uuid: snapshot.unique_id,
        name: snapshot.name,
        primary_group: snapshot.primary_group,
        nodes: snapshot.nodes.iter().map(stored_from_node).collect(),
    }
}

/// Converts a node into its stored form. Expiry is truncated to seconds.
pub fn stored_from_node(node: &Node) -> StoredNode {
    StoredNode {
        permission: node.permission().to_string(),
        value: node.value(),
        server: node.server_context().map(str::to_string),
        world: node.world_context().map(str::to_string),
        expiry: node.expiry().map(|expiry| expiry.timestamp()),
    }
}

/// Rebuilds a node from its stored form.
pub fn node_from_stored(stored: StoredNode) -> DomainResult<Node> {
    let mut builder = Node::builder(stored.permission).value(stored.value);
    if let Some(server) = stored.server {
        builder = builder.server(server);
    }
    if let Some(world) = stored.world {
        builder = builder.world(world);
    }
    if let Some(secs) = stored.expiry {
        let expiry = DateTime::from_timestamp(secs, 0).ok_or_else(|| DomainError::InvalidNode {
            message: format!("expiry out of range: {secs}"),
        })?;
        builder = builder.expiry(expiry);
    }
    builder.build()
}
