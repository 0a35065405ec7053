//! Identity-keyed entity cache with load-on-miss and explicit unload.
//!
//! One generic [`IdentityCache`] serves every entity kind: users are keyed
//! by [`UserIdentifier`], groups by their lowercased name. Each instance
//! takes a factory that builds an empty entity for an identifier.
//!
//! # Architecture
//!
//! Entries live in a `DashMap`, which gives:
//! - Concurrent reads and writes from the primary and background contexts
//!   without caller-side locking
//! - Atomic check-and-insert through the entry API, so concurrent first
//!   access to one identifier constructs exactly one entity
//!
//! Entries are never evicted by size or age. Removal is always an explicit
//! [`IdentityCache::unload`], tied to presence loss, and never persists.
//!
//! # Example
//!
//! ```rust,ignore
//! use rsperms_domain::cache::UserCache;
//! use rsperms_domain::model::UserIdentifier;
//!
//! let cache = UserCache::for_users();
//! let id = UserIdentifier::named(uuid::Uuid::new_v4(), "Alice");
//!
//! let user = cache.get_or_create(id.clone());
//! assert!(std::sync::Arc::ptr_eq(&user, &cache.get(&id).unwrap()));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::model::{Group, User, UserIdentifier};

/// Builds an empty entity for an identifier.
pub type EntityFactory<K, V> = Arc<dyn Fn(&K) -> V + Send + Sync>;

/// Cache of users keyed by identifier.
pub type UserCache = IdentityCache<UserIdentifier, User>;

/// Cache of groups keyed by lowercased name.
pub type GroupCache = IdentityCache<String, Group>;

/// Concurrent map from identifier to shared entity.
///
/// # Thread Safety
///
/// Fully thread-safe; share it behind an `Arc`. The factory runs while the
/// key's shard is locked and must not call back into the same cache.
pub struct IdentityCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Label used in metrics and logs.
    name: &'static str,
    entries: DashMap<K, Arc<V>>,
    factory: EntityFactory<K, V>,
}

impl<K, V> fmt::Debug for IdentityCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCache")
            .field("name", &self.name)
            .field("entry_count", &self.entries.len())
            .finish()
    }
}

impl<K, V> IdentityCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    /// Creates an empty cache with the given factory.
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        Self {
            name,
            entries: DashMap::new(),
            factory: Arc::new(factory),
        }
    }

    /// Returns the cache's label.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the cached entity, if loaded.
    ///
    /// # Metrics
    ///
    /// Records to `rsperms_cache_hits_total` / `rsperms_cache_misses_total`,
    /// labelled with the cache name.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let result = self.entries.get(key).map(|entry| Arc::clone(entry.value()));
        if result.is_some() {
            metrics::counter!("rsperms_cache_hits_total", "cache" => self.name).increment(1);
        } else {
            metrics::counter!("rsperms_cache_misses_total", "cache" => self.name).increment(1);
        }
        result
    }

    /// Returns the cached entity, constructing and registering it first if
    /// absent.
    ///
    /// Uses DashMap's entry API for atomic check-and-insert: concurrent
    /// callers with the same identifier all receive the one instance that
    /// was constructed.
    pub fn get_or_create(&self, key: K) -> Arc<V> {
        use dashmap::mapref::entry::Entry;

        match self.entries.entry(key) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let entity = Arc::new((self.factory)(entry.key()));
                debug!(cache = self.name, id = %entry.key(), "created cache entry");
                metrics::counter!("rsperms_cache_created_total", "cache" => self.name)
                    .increment(1);
                entry.insert(Arc::clone(&entity));
                entity
            }
        }
    }

    /// Removes an entity, discarding its in-memory state.
    ///
    /// Does not persist anything. Returns the removed entity, or `None` if it
    /// was not loaded.
    pub fn unload(&self, key: &K) -> Option<Arc<V>> {
        let removed = self.entries.remove(key).map(|(_, entity)| entity);
        if removed.is_some() {
            debug!(cache = self.name, id = %key, "unloaded cache entry");
            metrics::counter!("rsperms_cache_unloads_total", "cache" => self.name).increment(1);
        }
        removed
    }

    /// Returns true if an entity is loaded for `key`.
    pub fn is_loaded(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Snapshot of the current entries.
    pub fn get_all(&self) -> Vec<(K, Arc<V>)> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }

    /// Number of loaded entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl UserCache {
    /// Creates a user cache whose factory builds empty users.
    pub fn for_users() -> Self {
        Self::new("users", |id: &UserIdentifier| User::new(id.clone()))
    }
}

impl GroupCache {
    /// Creates a group cache whose factory builds empty groups.
    pub fn for_groups() -> Self {
        Self::new("groups", |name: &String| Group::new(name))
    }

    /// Looks up a group, normalizing the name's case.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.get(&name.to_lowercase())
    }

    /// Returns the group, creating it first if absent. The name's case is
    /// normalized.
    pub fn get_or_create_group(&self, name: &str) -> Arc<Group> {
        self.get_or_create(name.to_lowercase())
    }
}
