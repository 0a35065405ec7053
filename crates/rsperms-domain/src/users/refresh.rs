//! Results of a bulk refresh of connected users.

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Outcome of reloading one user.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// Internal unique id of the reloaded user.
    pub unique_id: Uuid,
    /// Whether the reload succeeded.
    pub result: DomainResult<()>,
}

/// Per-user outcomes of a bulk refresh. Failures are not aggregated.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub outcomes: Vec<RefreshOutcome>,
}

impl RefreshReport {
    /// Number of users a reload was issued for.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if no user was present.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Ids whose reload succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .map(|outcome| outcome.unique_id)
    }

    /// Outcomes whose reload failed.
    pub fn failed(&self) -> impl Iterator<Item = &RefreshOutcome> + '_ {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }
}

/// Handle to a running bulk refresh.
///
/// Dropping the handle does not cancel the refresh.
#[derive(Debug)]
pub struct RefreshHandle {
    receiver: oneshot::Receiver<RefreshReport>,
}

impl RefreshHandle {
    pub(crate) fn new(receiver: oneshot::Receiver<RefreshReport>) -> Self {
        Self { receiver }
    }

    /// Waits for every reload to finish.
    ///
    /// Fails with [`DomainError::TaskDropped`] if the scheduler discarded
    /// the refresh before it reported.
    pub async fn wait(self) -> DomainResult<RefreshReport> {
        self.receiver.await.map_err(|_| DomainError::TaskDropped {
            task: "refresh_active_users".to_string(),
        })
    }
}
