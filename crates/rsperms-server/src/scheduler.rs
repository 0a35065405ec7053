//! Tokio-backed execution contexts.
//!
//! The primary context is a single task draining an unbounded channel, so
//! primary work runs one closure at a time in submission order. Background
//! work is spawned straight onto the runtime and may run in parallel.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rsperms_domain::users::{BackgroundTask, PrimaryTask, TaskScheduler};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, warn};

/// [`TaskScheduler`] running on a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    primary: mpsc::UnboundedSender<PrimaryTask>,
    runtime: Handle,
}

impl TokioScheduler {
    /// Starts the primary context on `runtime`.
    pub fn new(runtime: Handle) -> Self {
        let (primary, mut receiver) = mpsc::unbounded_channel::<PrimaryTask>();

        // Ends once the scheduler is dropped and the queue is drained.
        runtime.spawn(async move {
            while let Some(task) = receiver.recv().await {
                // A panicking task must not take the primary context down.
                if catch_unwind(AssertUnwindSafe(task)).is_err() {
                    error!("primary task panicked");
                }
            }
        });

        Self { primary, runtime }
    }

    /// Resolves once every primary task submitted before this call has run.
    pub async fn flush_primary(&self) {
        let (sender, receiver) = oneshot::channel();
        self.run_on_primary(Box::new(move || {
            let _ = sender.send(());
        }));
        let _ = receiver.await;
    }
}

impl TaskScheduler for TokioScheduler {
    fn run_on_primary(&self, task: PrimaryTask) {
        if self.primary.send(task).is_err() {
            warn!("primary context stopped, dropping task");
        }
    }

    fn run_on_background(&self, task: BackgroundTask) {
        self.runtime.spawn(task);
    }
}
