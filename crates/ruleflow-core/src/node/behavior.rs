// crates/ruleflow-core/src/node/behavior.rs
// ============================================================================
// Module: Leaf Behaviors
// Description: User-supplied action, requirement, trigger and listener hooks.
// Purpose: Define the leaf contracts and erase them behind a guarded call.
// Dependencies: crate::context, crate::result, crate::target
// ============================================================================

//! ## Overview
//! Leaf behaviors are free of policy: they see a typed target and the
//! execution context and return a result. Nodes erase the target type and
//! call leaves through [`Behavior::invoke`], which turns both returned
//! errors and panics into ERROR results so that a faulty leaf never aborts
//! its siblings or the rest of a trigger batch.
//!
//! Closures with the matching signature implement every leaf trait.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::error::BehaviorError;
use crate::identifiers::NodeId;
use crate::result::EvalResult;
use crate::target::Target;
use crate::target::TargetType;

// ============================================================================
// SECTION: Leaf Traits
// ============================================================================

/// Outcome of a leaf behavior call.
pub type BehaviorResult = Result<EvalResult, BehaviorError>;

/// Side-effecting leaf behavior of an action node.
pub trait Action<T>: Send + Sync + 'static {
    /// Executes the action for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BehaviorError`] on an unexpected fault.
    fn execute(&self, target: &T, ctx: &ExecutionContext) -> BehaviorResult;
}

/// Check performed by a requirement node.
pub trait Requirement<T>: Send + Sync + 'static {
    /// Tests the requirement against `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BehaviorError`] on an unexpected fault.
    fn test(&self, target: &T, ctx: &ExecutionContext) -> BehaviorResult;
}

/// Per-target check performed by a trigger node before its requirements.
pub trait Trigger<T>: Send + Sync + 'static {
    /// Tests whether `target` may fire.
    ///
    /// # Errors
    ///
    /// Returns [`BehaviorError`] on an unexpected fault.
    fn test(&self, target: &T, ctx: &ExecutionContext) -> BehaviorResult;
}

impl<T, F> Action<T> for F
where
    F: Fn(&T, &ExecutionContext) -> BehaviorResult + Send + Sync + 'static,
{
    fn execute(&self, target: &T, ctx: &ExecutionContext) -> BehaviorResult {
        self(target, ctx)
    }
}

impl<T, F> Requirement<T> for F
where
    F: Fn(&T, &ExecutionContext) -> BehaviorResult + Send + Sync + 'static,
{
    fn test(&self, target: &T, ctx: &ExecutionContext) -> BehaviorResult {
        self(target, ctx)
    }
}

impl<T, F> Trigger<T> for F
where
    F: Fn(&T, &ExecutionContext) -> BehaviorResult + Send + Sync + 'static,
{
    fn test(&self, target: &T, ctx: &ExecutionContext) -> BehaviorResult {
        self(target, ctx)
    }
}

/// Observer notified after a trigger batch with the fired targets.
pub trait TriggerListener: Send + Sync + 'static {
    /// Receives the fired targets matching the listener's target type.
    fn on_trigger(&self, targets: &[Target], ctx: &ExecutionContext);
}

impl<F> TriggerListener for F
where
    F: Fn(&[Target], &ExecutionContext) + Send + Sync + 'static,
{
    fn on_trigger(&self, targets: &[Target], ctx: &ExecutionContext) {
        self(targets, ctx);
    }
}

// ============================================================================
// SECTION: Erased Behavior
// ============================================================================

/// Type-erased leaf call.
type ErasedCall = dyn Fn(&Target, &ExecutionContext) -> BehaviorResult + Send + Sync;

/// Type-erased leaf behavior with its declared target type.
#[derive(Clone)]
pub(crate) struct Behavior {
    /// Source type the leaf accepts.
    target_type: TargetType,
    /// Erased call.
    call: Arc<ErasedCall>,
}

impl Behavior {
    /// Erases a leaf that operates on sources of type `T`.
    pub(crate) fn typed<T, F>(call: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T, &ExecutionContext) -> BehaviorResult + Send + Sync + 'static,
    {
        Self {
            target_type: TargetType::of::<T>(),
            call: Arc::new(move |target: &Target, ctx: &ExecutionContext| -> BehaviorResult {
                target.source_as::<T>().map_or_else(|| Ok(EvalResult::empty()), |source| call(source, ctx))
            }),
        }
    }

    /// Erases a leaf that accepts every target.
    pub(crate) fn untyped<F>(call: F) -> Self
    where
        F: Fn(&Target, &ExecutionContext) -> BehaviorResult + Send + Sync + 'static,
    {
        Self {
            target_type: TargetType::any(),
            call: Arc::new(call),
        }
    }

    /// Returns the accepted source type.
    pub(crate) const fn target_type(&self) -> TargetType {
        self.target_type
    }

    /// Calls the leaf, converting errors and panics into ERROR results.
    pub(crate) fn invoke(&self, node: &NodeId, target: &Target, ctx: &ExecutionContext) -> EvalResult {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.call)(target, ctx))) {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                tracing::warn!(node = %node, target = %target.unique_id(), error = %err, "leaf behavior failed");
                EvalResult::error().with_message(err.message())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(node = %node, target = %target.unique_id(), panic = %message, "leaf behavior panicked");
                EvalResult::error().with_message(message)
            }
        }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behavior").field("target_type", &self.target_type).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Listener Entries
// ============================================================================

/// Registered trigger listener with the source type it observes.
#[derive(Clone)]
pub(crate) struct ListenerEntry {
    /// Source type the listener observes.
    pub(crate) target_type: TargetType,
    /// Listener callback.
    pub(crate) listener: Arc<dyn TriggerListener>,
}

impl ListenerEntry {
    /// Calls the listener with the matching sub-batch, if any.
    pub(crate) fn notify(&self, node: &NodeId, fired: &[Target], ctx: &ExecutionContext) {
        let batch: Vec<Target> = fired.iter().filter(|target| self.target_type.matches(target)).cloned().collect();
        if batch.is_empty() {
            return;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.listener.on_trigger(&batch, ctx)));
        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            tracing::error!(node = %node, listener = %self.target_type, panic = %message, "trigger listener panicked");
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "leaf behavior panicked".to_string())
}
