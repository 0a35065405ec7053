//! The user manager.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::config::UserManagerConfig;
use super::refresh::{RefreshHandle, RefreshOutcome, RefreshReport};
use super::traits::{IdentifierTranslator, PresenceRegistry, TaskScheduler, UserStorage};
use crate::cache::UserCache;
use crate::error::{DomainError, DomainResult};
use crate::model::{Node, User, UserIdentifier};

/// External collaborators of the [`UserManager`].
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn UserStorage>,
    pub presence: Arc<dyn PresenceRegistry>,
    pub translator: Arc<dyn IdentifierTranslator>,
    pub scheduler: Arc<dyn TaskScheduler>,
}

/// Resolves, repairs and reclaims cached users.
///
/// The manager shares the user cache with the storage collaborator (which
/// populates it on load) but owns no user itself: every operation takes a
/// user fetched from the cache for the duration of the call.
pub struct UserManager {
    cache: Arc<UserCache>,
    storage: Arc<dyn UserStorage>,
    presence: Arc<dyn PresenceRegistry>,
    translator: Arc<dyn IdentifierTranslator>,
    scheduler: Arc<dyn TaskScheduler>,
    config: UserManagerConfig,
    /// Membership node granted by default-group repair.
    default_node: Node,
}

impl std::fmt::Debug for UserManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserManager")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}

impl UserManager {
    /// Creates a manager over `cache`.
    ///
    /// Fails with [`DomainError::InvalidNode`] if the configured default
    /// group cannot be expressed as a group node.
    pub fn new(
        config: UserManagerConfig,
        cache: Arc<UserCache>,
        collaborators: Collaborators,
    ) -> DomainResult<Self> {
        let default_node = Node::group(&config.default_group)?;
        Ok(Self {
            cache,
            storage: collaborators.storage,
            presence: collaborators.presence,
            translator: collaborators.translator,
            scheduler: collaborators.scheduler,
            config,
            default_node,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &UserManagerConfig {
        &self.config
    }

    /// Returns the user cache.
    pub fn cache(&self) -> &Arc<UserCache> {
        &self.cache
    }

    /// Number of cached users.
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }

    /// Finds a cached user by display name, ignoring case.
    ///
    /// Only cached users are searched; this never loads from storage.
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<User>> {
        self.cache
            .get_all()
            .into_iter()
            .map(|(_, user)| user)
            .find(|user| user.name_matches(name))
    }

    /// Finds a cached user by internal unique id.
    pub fn lookup_by_unique_id(&self, unique_id: Uuid) -> Option<Arc<User>> {
        self.cache.get(&UserIdentifier::of(unique_id))
    }

    /// Makes sure `user` belongs to at least one group.
    ///
    /// A user counts as grouped when its primary group is set and one of its
    /// permanent nodes is a group node. Temporary group grants are ignored,
    /// so a user holding only a temporary grant gets a permanent default
    /// membership next to it.
    ///
    /// Ungrouped users get the default group as primary group plus a
    /// membership node for it. If `persist` is set a save of the repaired
    /// user is launched on the background context and detached.
    ///
    /// Returns true if the user was changed.
    pub fn normalize_default_group(&self, user: &User, persist: bool) -> bool {
        {
            let mut state = user.write();
            if state.has_permanent_group() {
                return false;
            }

            state.primary_group = Some(self.config.default_group.clone());
            match state.nodes.insert(self.default_node.clone()) {
                // Already granted by an earlier or concurrent repair.
                Ok(()) | Err(DomainError::NodeAlreadyPresent { .. }) => {}
                Err(err) => {
                    warn!(user = %user.id(), error = %err, "failed to grant default group");
                }
            }
        }

        debug!(
            user = %user.id(),
            group = %self.config.default_group,
            "assigned default group"
        );

        if persist {
            self.request_save(user);
        }
        true
    }

    /// Decides whether `user` needs to be written to storage.
    ///
    /// Returns false only when the user is indistinguishable from an
    /// untouched default member: exactly one node, which is a permanent,
    /// unscoped membership node for the default group, and the default group
    /// as primary group (both compared ignoring case). The node's value is
    /// not considered.
    pub fn should_persist(&self, user: &User) -> bool {
        let default_group = &self.config.default_group;
        let state = user.read();

        let mut nodes = state.nodes.iter();
        let (Some(node), None) = (nodes.next(), nodes.next()) else {
            return true;
        };

        if !node.is_group_node() {
            return true;
        }
        if node.is_temporary() || node.is_server_specific() || node.is_world_specific() {
            return true;
        }
        if !node
            .group_name()
            .is_some_and(|group| group == default_group.to_lowercase())
        {
            return true;
        }

        !state
            .primary_group
            .as_deref()
            .is_some_and(|group| group.to_lowercase() == default_group.to_lowercase())
    }

    /// Unloads `user` if its principal is no longer connected.
    ///
    /// Never persists: any save must have happened at disconnect. Safe to
    /// call repeatedly. Returns true if the user was unloaded by this call.
    pub fn cleanup(&self, user: &User) -> bool {
        let external_id = self.translator.internal_to_external(user.unique_id());
        if self.presence.is_present(external_id) {
            return false;
        }

        let unloaded = self.cache.unload(user.id()).is_some();
        if unloaded {
            debug!(user = %user.id(), "unloaded disconnected user");
        }
        unloaded
    }

    /// Reloads every connected user from storage.
    ///
    /// Phase one runs on the primary context and snapshots the connected
    /// principals. Phase two runs on the background context and issues one
    /// storage reload per principal, all concurrently.
    ///
    /// This does more than a plain reload: each reloaded user also gets
    /// default-group repair (without persisting), and a user whose principal
    /// left between the two phases is unloaded again right away.
    ///
    /// Returns immediately. A failed reload is logged, counted and reported
    /// for its own id only; the other reloads still complete.
    pub fn refresh_active_users(self: &Arc<Self>) -> RefreshHandle {
        let (sender, receiver) = oneshot::channel();
        let manager = Arc::clone(self);

        self.scheduler.run_on_primary(Box::new(move || {
            let present = manager.presence.present_external_ids();
            debug!(count = present.len(), "captured connected users for refresh");

            let background = Arc::clone(&manager);
            manager.scheduler.run_on_background(Box::pin(async move {
                let report = background.reload_all(present).await;
                // Nobody waiting is fine: the handle may have been dropped.
                let _ = sender.send(report);
            }));
        }));

        RefreshHandle::new(receiver)
    }

    async fn reload_all(&self, external_ids: HashSet<Uuid>) -> RefreshReport {
        let reloads = external_ids.into_iter().map(|external_id| {
            let unique_id = self.translator.external_to_internal(external_id);
            async move {
                let result = match self.storage.load_user(unique_id, None).await {
                    Ok(user) => {
                        // The load re-created the entry; drop it if the
                        // principal disconnected after the snapshot.
                        if !self.cleanup(&user) {
                            self.normalize_default_group(&user, false);
                        }
                        Ok(())
                    }
                    Err(err) => {
                        warn!(user = %unique_id, error = %err, "failed to reload user");
                        metrics::counter!("rsperms_refresh_failures_total").increment(1);
                        Err(err)
                    }
                };
                RefreshOutcome { unique_id, result }
            }
        });

        let report = RefreshReport {
            outcomes: join_all(reloads).await,
        };
        info!(
            reloaded = report.succeeded().count(),
            failed = report.failed().count(),
            "refreshed connected users"
        );
        report
    }

    /// Persists a snapshot of `user`, waiting for storage to finish.
    #[instrument(skip(self, user), fields(user = %user.id()))]
    pub async fn save(&self, user: &User) -> DomainResult<()> {
        self.storage.save_user(user.snapshot()).await
    }

    /// Launches a save of `user`'s current state on the background context
    /// and detaches from it.
    ///
    /// The snapshot is taken before this returns, so later changes are not
    /// part of this save. Failures are logged and counted in
    /// `rsperms_save_failures_total`.
    pub fn request_save(&self, user: &User) {
        let snapshot = user.snapshot();
        let storage = Arc::clone(&self.storage);

        self.scheduler.run_on_background(Box::pin(async move {
            let unique_id = snapshot.unique_id;
            if let Err(err) = storage.save_user(snapshot).await {
                warn!(user = %unique_id, error = %err, "detached user save failed");
                metrics::counter!("rsperms_save_failures_total").increment(1);
            }
        }));
    }
}
