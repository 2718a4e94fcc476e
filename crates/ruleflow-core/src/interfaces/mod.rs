// crates/ruleflow-core/src/interfaces/mod.rs
// ============================================================================
// Module: Ruleflow Interfaces
// Description: Backend-agnostic collaborator contracts for the node runtime.
// Purpose: Define storage, scheduling, time and veto surfaces.
// Dependencies: crate::identifiers, crate::target
// ============================================================================

//! ## Overview
//! The runtime never reaches for a global: counters go through [`Storage`],
//! deferred bodies through [`Scheduler`], time through [`Clock`] and external
//! cancellation through [`ExecutionVeto`]. All of them are carried explicitly
//! by a [`Scope`](crate::Scope).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::NodeId;
use crate::target::Target;

// ============================================================================
// SECTION: Storage
// ============================================================================

/// Counter storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend reported an error.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// A value could not be encoded for storage.
    #[error("storage encode error for {key}: {message}")]
    Encode {
        /// Storage key being written.
        key: String,
        /// Encoder message.
        message: String,
    },
}

/// Key-value store for per-(node, target) counters.
///
/// Keys have the shape `node#target#counter`. Values are JSON so that
/// backends can persist them without knowing the counter types.
pub trait Storage: Send + Sync {
    /// Stores `value` under `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot write.
    fn set(&self, key: &str, value: Value) -> Result<Option<Value>, StorageError>;

    /// Loads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot read.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Deferred body handed to a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Scheduler errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler refused the task.
    #[error("scheduler rejected task: {0}")]
    Rejected(String),
}

/// Fire-and-forget runner for delayed bodies.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once `delay` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] when the task cannot be accepted.
    fn run_later(&self, task: Task, delay: Duration) -> Result<(), SchedulerError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current time for cooldown bookkeeping.
pub trait Clock: Send + Sync {
    /// Returns milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

// ============================================================================
// SECTION: Execution Veto
// ============================================================================

/// Point in node evaluation where an external veto is consulted.
#[derive(Debug, Clone, Copy)]
pub enum VetoEvent<'a> {
    /// Before an action's gates and requirements are evaluated.
    PreActionExecution {
        /// Action node about to execute.
        node: &'a NodeId,
        /// Target it executes for.
        target: &'a Target,
    },
    /// Before an action's leaf behavior runs.
    ActionExecution {
        /// Action node about to run its leaf.
        node: &'a NodeId,
        /// Target it runs for.
        target: &'a Target,
    },
    /// Before a trigger processes a batch.
    TriggerExecution {
        /// Trigger node about to run.
        node: &'a NodeId,
        /// Targets in the batch.
        targets: &'a [Target],
    },
}

impl VetoEvent<'_> {
    /// Returns the node the event concerns.
    #[must_use]
    pub const fn node(&self) -> &NodeId {
        match self {
            Self::PreActionExecution {
                node, ..
            }
            | Self::ActionExecution {
                node, ..
            }
            | Self::TriggerExecution {
                node, ..
            } => node,
        }
    }
}

/// External collaborator that may cancel node execution.
///
/// A veto is reported exactly like an internally produced CANCELLED result.
pub trait ExecutionVeto: Send + Sync {
    /// Returns true to cancel the evaluation described by `event`.
    fn veto(&self, event: &VetoEvent<'_>) -> bool;
}
