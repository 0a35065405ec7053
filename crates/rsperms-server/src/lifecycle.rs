//! Connect and disconnect handling.
//!
//! Login loads the user and repairs its default membership in memory only.
//! Disconnect writes the user back unless it is an untouched default member,
//! then unloads it once the principal has left the presence registry.

use std::sync::Arc;

use rsperms_domain::users::{IdentifierTranslator, UserStorage};
use rsperms_domain::{DomainResult, User, UserManager};
use tracing::{debug, instrument};
use uuid::Uuid;

/// What a disconnect did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// The user was not cached; nothing to do.
    NotLoaded,
    /// The user was cached.
    Handled {
        /// Whether a save was written.
        saved: bool,
        /// Whether the user was unloaded.
        unloaded: bool,
    },
}

/// Login and disconnect glue around a [`UserManager`].
#[derive(Clone)]
pub struct UserLifecycle {
    manager: Arc<UserManager>,
    storage: Arc<dyn UserStorage>,
    translator: Arc<dyn IdentifierTranslator>,
}

impl UserLifecycle {
    pub fn new(
        manager: Arc<UserManager>,
        storage: Arc<dyn UserStorage>,
        translator: Arc<dyn IdentifierTranslator>,
    ) -> Self {
        Self {
            manager,
            storage,
            translator,
        }
    }

    /// Loads the connecting principal's user and makes sure it has a group.
    #[instrument(skip(self))]
    pub async fn handle_login(&self, external_id: Uuid, name: &str) -> DomainResult<Arc<User>> {
        let unique_id = self.translator.external_to_internal(external_id);
        let user = self.storage.load_user(unique_id, Some(name)).await?;
        self.manager.normalize_default_group(&user, false);
        Ok(user)
    }

    /// Saves the departing principal's user if needed, then unloads it.
    ///
    /// The principal must already be gone from the presence registry for the
    /// unload to happen. A failed save is returned and the user stays cached.
    #[instrument(skip(self))]
    pub async fn handle_disconnect(&self, external_id: Uuid) -> DomainResult<DisconnectOutcome> {
        let unique_id = self.translator.external_to_internal(external_id);
        let Some(user) = self.manager.lookup_by_unique_id(unique_id) else {
            return Ok(DisconnectOutcome::NotLoaded);
        };

        let saved = self.manager.should_persist(&user);
        if saved {
            self.manager.save(&user).await?;
        } else {
            debug!(user = %user.id(), "skipping save of default-only user");
            metrics::counter!("rsperms_saves_elided_total").increment(1);
        }

        let unloaded = self.manager.cleanup(&user);
        Ok(DisconnectOutcome::Handled { saved, unloaded })
    }
}

impl std::fmt::Debug for UserLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLifecycle")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
