//! Runtime wiring.

use std::sync::Arc;

use anyhow::{bail, Context};
use rsperms_domain::users::{
    Collaborators, IdentifierTranslator, PresenceRegistry, TaskScheduler, UserStorage,
};
use rsperms_domain::{GroupCache, PermissionResolver, UserCache, UserManager};
use rsperms_storage::MemoryUserDataStore;
use tokio::runtime::Handle;
use tracing::info;

use crate::adapters::DataStoreUserStorage;
use crate::config::RspermsConfig;
use crate::lifecycle::UserLifecycle;
use crate::observability::{describe_metrics, init_logging};
use crate::scheduler::TokioScheduler;

/// Every long-lived component, wired together.
pub struct Runtime {
    pub config: RspermsConfig,
    pub store: Arc<MemoryUserDataStore>,
    pub users: Arc<UserCache>,
    pub groups: Arc<GroupCache>,
    pub scheduler: Arc<TokioScheduler>,
    pub manager: Arc<UserManager>,
    pub resolver: PermissionResolver,
    pub lifecycle: UserLifecycle,
}

impl Runtime {
    /// Builds the runtime on the current tokio runtime.
    ///
    /// The host supplies presence and id translation; everything else is
    /// created here from `config`.
    pub fn start(
        config: RspermsConfig,
        presence: Arc<dyn PresenceRegistry>,
        translator: Arc<dyn IdentifierTranslator>,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;
        describe_metrics();

        let store = match config.storage.backend.as_str() {
            "memory" => MemoryUserDataStore::new_shared(),
            other => bail!("unsupported storage backend: {other}"),
        };

        let handle = Handle::try_current().context("rsperms must start inside a tokio runtime")?;
        let scheduler = Arc::new(TokioScheduler::new(handle));

        let users = Arc::new(UserCache::for_users());
        let groups = Arc::new(GroupCache::for_groups());
        let storage: Arc<dyn UserStorage> = Arc::new(DataStoreUserStorage::new(
            Arc::clone(&store),
            Arc::clone(&users),
        ));

        let collaborators = Collaborators {
            storage: Arc::clone(&storage),
            presence,
            translator: Arc::clone(&translator),
            scheduler: Arc::clone(&scheduler) as Arc<dyn TaskScheduler>,
        };
        let manager = Arc::new(
            UserManager::new(
                config.users.to_manager_config(),
                Arc::clone(&users),
                collaborators,
            )
            .context("failed to create user manager")?,
        );

        let resolver =
            PermissionResolver::with_config(Arc::clone(&groups), config.resolver.to_resolver_config());
        let lifecycle = UserLifecycle::new(Arc::clone(&manager), storage, translator);

        info!(
            backend = %config.storage.backend,
            default_group = %manager.config().default_group,
            "rsperms runtime started"
        );

        Ok(Self {
            config,
            store,
            users,
            groups,
            scheduler,
            manager,
            resolver,
            lifecycle,
        })
    }

    /// Installs the global log subscriber described by the configuration.
    pub fn init_logging(config: &RspermsConfig) {
        init_logging(config.logging.to_logging_config());
    }
}
