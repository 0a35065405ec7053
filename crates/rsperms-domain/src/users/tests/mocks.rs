//! Mock collaborators for user manager testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::cache::UserCache;
use crate::error::{DomainError, DomainResult};
use crate::model::{User, UserIdentifier, UserSnapshot};
use crate::users::{
    BackgroundTask, Collaborators, IdentifierTranslator, PresenceRegistry, PrimaryTask,
    TaskScheduler, UserManager, UserManagerConfig, UserStorage,
};

/// Mock storage that loads into a shared user cache and records calls.
pub struct MockStorage {
    cache: Arc<UserCache>,
    records: Mutex<HashMap<Uuid, UserSnapshot>>,
    failing_loads: Mutex<HashSet<Uuid>>,
    fail_saves: Mutex<bool>,
    saves: Mutex<Vec<UserSnapshot>>,
    loads: Mutex<Vec<Uuid>>,
}

impl MockStorage {
    pub fn new(cache: Arc<UserCache>) -> Self {
        Self {
            cache,
            records: Mutex::new(HashMap::new()),
            failing_loads: Mutex::new(HashSet::new()),
            fail_saves: Mutex::new(false),
            saves: Mutex::new(Vec::new()),
            loads: Mutex::new(Vec::new()),
        }
    }

    pub fn insert_record(&self, record: UserSnapshot) {
        self.records.lock().unwrap().insert(record.unique_id, record);
    }

    pub fn fail_load_for(&self, unique_id: Uuid) {
        self.failing_loads.lock().unwrap().insert(unique_id);
    }

    pub fn fail_saves(&self) {
        *self.fail_saves.lock().unwrap() = true;
    }

    pub fn saves(&self) -> Vec<UserSnapshot> {
        self.saves.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<Uuid> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStorage for MockStorage {
    async fn save_user(&self, user: UserSnapshot) -> DomainResult<()> {
        if *self.fail_saves.lock().unwrap() {
            return Err(DomainError::Storage {
                message: "save rejected".to_string(),
            });
        }
        self.saves.lock().unwrap().push(user);
        Ok(())
    }

    async fn load_user(
        &self,
        unique_id: Uuid,
        fallback_name: Option<&str>,
    ) -> DomainResult<Arc<User>> {
        self.loads.lock().unwrap().push(unique_id);

        if self.failing_loads.lock().unwrap().contains(&unique_id) {
            return Err(DomainError::Storage {
                message: format!("load failed for {unique_id}"),
            });
        }

        let record = self.records.lock().unwrap().get(&unique_id).cloned();
        let user = self.cache.get_or_create(UserIdentifier::of(unique_id));
        match record {
            Some(record) => user.replace_data(
                record.name.or_else(|| fallback_name.map(str::to_string)),
                record.primary_group,
                record.nodes,
            ),
            None => user.replace_data(fallback_name.map(str::to_string), None, Vec::new()),
        }
        Ok(user)
    }
}

/// Mock presence registry backed by a set of external ids.
#[derive(Default)]
pub struct MockPresence {
    present: Mutex<HashSet<Uuid>>,
}

impl MockPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, external_id: Uuid) {
        self.present.lock().unwrap().insert(external_id);
    }

    pub fn disconnect(&self, external_id: Uuid) {
        self.present.lock().unwrap().remove(&external_id);
    }
}

impl PresenceRegistry for MockPresence {
    fn is_present(&self, external_id: Uuid) -> bool {
        self.present.lock().unwrap().contains(&external_id)
    }

    fn present_external_ids(&self) -> HashSet<Uuid> {
        self.present.lock().unwrap().clone()
    }
}

/// Translator with explicit external -> internal pairs; unmapped ids pass
/// through unchanged.
#[derive(Default)]
pub struct MappedTranslator {
    to_internal: Mutex<HashMap<Uuid, Uuid>>,
}

impl MappedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map(&self, external_id: Uuid, internal_id: Uuid) {
        self.to_internal
            .lock()
            .unwrap()
            .insert(external_id, internal_id);
    }
}

impl IdentifierTranslator for MappedTranslator {
    fn external_to_internal(&self, external_id: Uuid) -> Uuid {
        self.to_internal
            .lock()
            .unwrap()
            .get(&external_id)
            .copied()
            .unwrap_or(external_id)
    }

    fn internal_to_external(&self, internal_id: Uuid) -> Uuid {
        self.to_internal
            .lock()
            .unwrap()
            .iter()
            .find(|(_, internal)| **internal == internal_id)
            .map(|(external, _)| *external)
            .unwrap_or(internal_id)
    }
}

/// Scheduler that queues tasks until the test drives them.
#[derive(Default)]
pub struct ManualScheduler {
    primary: Mutex<Vec<PrimaryTask>>,
    background: Mutex<Vec<BackgroundTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_primary(&self) -> usize {
        self.primary.lock().unwrap().len()
    }

    pub fn pending_background(&self) -> usize {
        self.background.lock().unwrap().len()
    }

    /// Runs queued primary tasks in submission order.
    pub fn run_primary(&self) {
        let tasks: Vec<PrimaryTask> = std::mem::take(&mut *self.primary.lock().unwrap());
        for task in tasks {
            task();
        }
    }

    /// Awaits queued background tasks.
    pub async fn run_background(&self) {
        let tasks: Vec<BackgroundTask> = std::mem::take(&mut *self.background.lock().unwrap());
        for task in tasks {
            task.await;
        }
    }

    /// Drops every queued task without running it.
    pub fn discard_pending(&self) {
        self.primary.lock().unwrap().clear();
        self.background.lock().unwrap().clear();
    }

    /// Runs everything until both queues are empty.
    pub async fn drain(&self) {
        while self.pending_primary() > 0 || self.pending_background() > 0 {
            self.run_primary();
            self.run_background().await;
        }
    }
}

impl TaskScheduler for ManualScheduler {
    fn run_on_primary(&self, task: PrimaryTask) {
        self.primary.lock().unwrap().push(task);
    }

    fn run_on_background(&self, task: BackgroundTask) {
        self.background.lock().unwrap().push(task);
    }
}

/// A manager wired to mocks, with handles to each mock.
pub struct Harness {
    pub manager: Arc<UserManager>,
    pub cache: Arc<UserCache>,
    pub storage: Arc<MockStorage>,
    pub presence: Arc<MockPresence>,
    pub translator: Arc<MappedTranslator>,
    pub scheduler: Arc<ManualScheduler>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(UserManagerConfig::default())
    }

    pub fn with_config(config: UserManagerConfig) -> Self {
        let cache = Arc::new(UserCache::for_users());
        let storage = Arc::new(MockStorage::new(Arc::clone(&cache)));
        let presence = Arc::new(MockPresence::new());
        let translator = Arc::new(MappedTranslator::new());
        let scheduler = Arc::new(ManualScheduler::new());

        let collaborators = collaborators_of(&storage, &presence, &translator, &scheduler);
        let manager = Arc::new(
            UserManager::new(config, Arc::clone(&cache), collaborators)
                .expect("valid manager config"),
        );

        Self {
            manager,
            cache,
            storage,
            presence,
            translator,
            scheduler,
        }
    }

    /// Collaborators pointing at this harness's mocks.
    pub fn collaborators(&self) -> Collaborators {
        collaborators_of(
            &self.storage,
            &self.presence,
            &self.translator,
            &self.scheduler,
        )
    }

    /// Creates a cached user with a display name.
    pub fn cached_user(&self, name: &str) -> Arc<User> {
        self.cache
            .get_or_create(UserIdentifier::named(Uuid::new_v4(), name))
    }
}

fn collaborators_of(
    storage: &Arc<MockStorage>,
    presence: &Arc<MockPresence>,
    translator: &Arc<MappedTranslator>,
    scheduler: &Arc<ManualScheduler>,
) -> Collaborators {
    Collaborators {
        storage: Arc::clone(storage) as Arc<dyn UserStorage>,
        presence: Arc::clone(presence) as Arc<dyn PresenceRegistry>,
        translator: Arc::clone(translator) as Arc<dyn IdentifierTranslator>,
        scheduler: Arc::clone(scheduler) as Arc<dyn TaskScheduler>,
    }
}
