// crates/ruleflow-core/src/error.rs
// ============================================================================
// Module: Ruleflow Errors
// Description: Error types raised by leaf behaviors and node operations.
// Purpose: Separate domain faults from collaborator failures.
// Dependencies: crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! Expected domain outcomes never surface as errors: they are results.
//! [`BehaviorError`] is what a leaf behavior raises for an unexpected fault;
//! the node boundary converts it into an ERROR result. [`RuntimeError`] is
//! reserved for collaborator failures (storage, scheduler) that prevent a
//! node from evaluating at all.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::SchedulerError;
use crate::interfaces::StorageError;

// ============================================================================
// SECTION: Behavior Error
// ============================================================================

/// Fault raised by a leaf behavior.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BehaviorError {
    /// Human-readable fault description.
    message: String,
}

impl BehaviorError {
    /// Creates a behavior error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the fault description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for BehaviorError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BehaviorError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Runtime Error
// ============================================================================

/// Collaborator failure that stopped a node operation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Counter storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Deferred body could not be scheduled.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}
