// crates/ruleflow-core/src/runtime/scheduler.rs
// ============================================================================
// Module: Tokio Scheduler
// Description: Scheduler that runs delayed bodies on a tokio runtime.
// Purpose: Defer node bodies without blocking the calling thread.
// Dependencies: crate::interfaces, tokio
// ============================================================================

//! ## Overview
//! [`TokioScheduler`] spawns one task per deferred body that sleeps for the
//! requested delay and then runs the body on a blocking-capable worker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use tokio::runtime::Handle;

use crate::interfaces::Scheduler;
use crate::interfaces::SchedulerError;
use crate::interfaces::Task;

// ============================================================================
// SECTION: Tokio Scheduler
// ============================================================================

/// Scheduler backed by a tokio runtime handle.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    /// Runtime the deferred bodies are spawned on.
    handle: Handle,
}

impl TokioScheduler {
    /// Creates a scheduler for the given runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
        }
    }

    /// Creates a scheduler for the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when called outside a tokio runtime.
    pub fn from_current() -> Result<Self, SchedulerError> {
        Handle::try_current().map(Self::new).map_err(|err| SchedulerError::Rejected(err.to_string()))
    }
}

impl Scheduler for TokioScheduler {
    fn run_later(&self, task: Task, delay: Duration) -> Result<(), SchedulerError> {
        let handle = self.handle.clone();
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = handle.spawn_blocking(task).await {
                tracing::error!(error = %err, "deferred body did not finish");
            }
        });
        drop(join);
        Ok(())
    }
}
