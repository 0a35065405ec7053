//! Collaborators the user resolution service consumes.
//!
//! None of these are implemented in this crate; the host wires in its own
//! storage, presence registry, identifier translation and scheduler.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::model::{User, UserSnapshot};

/// A unit of work for the primary (serial) context.
pub type PrimaryTask = Box<dyn FnOnce() + Send + 'static>;

/// A unit of work for the background (I/O) context.
pub type BackgroundTask = BoxFuture<'static, ()>;

/// Durable storage of user data.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Persists a user snapshot.
    async fn save_user(&self, user: UserSnapshot) -> DomainResult<()>;

    /// Loads a user's data into the cache and returns the cached user.
    ///
    /// `fallback_name` is used as the display name when storage has none.
    async fn load_user(&self, unique_id: Uuid, fallback_name: Option<&str>)
        -> DomainResult<Arc<User>>;
}

/// Registry of principals currently connected to the host.
pub trait PresenceRegistry: Send + Sync {
    /// Returns true if the principal with this external id is connected.
    fn is_present(&self, external_id: Uuid) -> bool;

    /// Snapshot of the external ids of connected principals. Taken on the
    /// primary context.
    fn present_external_ids(&self) -> HashSet<Uuid>;
}

/// Stable bidirectional mapping between external and internal unique ids.
pub trait IdentifierTranslator: Send + Sync {
    /// Maps the externally visible id to the internal one.
    fn external_to_internal(&self, external_id: Uuid) -> Uuid;

    /// Maps the internal id to the externally visible one.
    fn internal_to_external(&self, internal_id: Uuid) -> Uuid;
}

/// Schedules work on the host's two execution contexts.
pub trait TaskScheduler: Send + Sync {
    /// Runs `task` on the primary context. Primary tasks run to completion
    /// one at a time.
    fn run_on_primary(&self, task: PrimaryTask);

    /// Runs `task` on the background context.
    fn run_on_background(&self, task: BackgroundTask);
}

/// Translator for hosts where external and internal ids coincide.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl IdentifierTranslator for IdentityTranslator {
    fn external_to_internal(&self, external_id: Uuid) -> Uuid {
        external_id
    }

    fn internal_to_external(&self, internal_id: Uuid) -> Uuid {
        internal_id
    }
}
