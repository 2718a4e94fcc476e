// crates/ruleflow-core/src/node/trigger.rs
// ============================================================================
// Module: Trigger Nodes
// Description: Batched trigger firing with per-target gates and listeners.
// Purpose: Turn an externally fired identifier into per-target executions.
// Dependencies: crate::context, crate::interfaces, crate::node, crate::result
// ============================================================================

//! ## Overview
//! A [`TriggerNode`] listens for one identifier (matched case-insensitively).
//! When fired with a batch of targets it processes them sequentially. A
//! target is skipped when its gates fail, its leaf check fails or its
//! requirements are not met; otherwise `last_execution` is stamped and, with
//! `execute_actions`, the attached actions run for it. Skipping one target
//! never stops the batch.
//!
//! After the batch, every registered listener receives one call with the
//! fired targets whose source matches the listener's type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::context::NodeKind;
use crate::context::NodeRef;
use crate::context::Scope;
use crate::error::RuntimeError;
use crate::identifiers::NodeId;
use crate::interfaces::VetoEvent;
use crate::node::action::ActionNode;
use crate::node::behavior::Behavior;
use crate::node::behavior::ListenerEntry;
use crate::node::behavior::Trigger;
use crate::node::behavior::TriggerListener;
use crate::node::config::TriggerConfig;
use crate::node::gates;
use crate::node::gates::LAST_EXECUTION;
use crate::node::requirement::RequirementNode;
use crate::node::requirement::test_all;
use crate::result::CombinedResult;
use crate::result::EvalResult;
use crate::result::FutureResult;
use crate::result::TargetResult;
use crate::target::Target;
use crate::target::TargetType;
use crate::time::format_duration;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of processing one target of a batch.
enum TargetOutcome {
    /// Target was skipped; the result explains why.
    Skipped(CombinedResult),
    /// Target fired.
    Fired {
        /// Trigger and requirement results for the target.
        result: CombinedResult,
        /// Futures of the actions executed for the target.
        actions: Vec<FutureResult>,
    },
}

/// Configured trigger wrapper.
///
/// # Invariants
/// - The node identifier is fixed at construction; clones share counters.
/// - Listeners are called once per batch at most.
#[derive(Clone)]
pub struct TriggerNode {
    /// Stable node identifier.
    id: NodeId,
    /// Fired identifier this trigger listens for.
    identifier: String,
    /// Optional per-target leaf check.
    behavior: Option<Behavior>,
    /// Policy config.
    config: TriggerConfig,
    /// Actions executed for fired targets.
    actions: Vec<ActionNode>,
    /// Requirements checked per target.
    requirements: Vec<RequirementNode>,
    /// Registered listeners.
    listeners: Vec<ListenerEntry>,
}

impl TriggerNode {
    /// Creates a trigger listening for `identifier`, accepting every target.
    #[must_use]
    pub fn new(identifier: impl Into<String>, config: TriggerConfig) -> Self {
        let id = config.identifier.clone().map_or_else(NodeId::generate, NodeId::new);
        Self {
            id,
            identifier: identifier.into(),
            behavior: None,
            config,
            actions: Vec::new(),
            requirements: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Returns the trigger with a leaf check over sources of type `T`.
    ///
    /// Targets of another type are skipped.
    #[must_use]
    pub fn with_behavior<T, B>(mut self, behavior: B) -> Self
    where
        T: Any + Send + Sync,
        B: Trigger<T>,
    {
        self.behavior = Some(Behavior::typed::<T, _>(move |target: &T, ctx: &ExecutionContext| behavior.test(target, ctx)));
        self
    }

    /// Returns the trigger with a leaf check that accepts every target.
    #[must_use]
    pub fn with_any_behavior<B>(mut self, behavior: B) -> Self
    where
        B: Trigger<Target>,
    {
        self.behavior = Some(Behavior::untyped(move |target: &Target, ctx: &ExecutionContext| behavior.test(target, ctx)));
        self
    }

    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the fired identifier this trigger listens for.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the policy config.
    #[must_use]
    pub const fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Returns the accepted source type.
    #[must_use]
    pub fn target_type(&self) -> TargetType {
        self.behavior.as_ref().map_or_else(TargetType::any, Behavior::target_type)
    }

    /// Returns the attached actions.
    #[must_use]
    pub fn actions(&self) -> &[ActionNode] {
        &self.actions
    }

    /// Returns the attached requirements.
    #[must_use]
    pub fn requirements(&self) -> &[RequirementNode] {
        &self.requirements
    }

    /// Appends an attached action.
    pub fn add_action(&mut self, action: ActionNode) {
        self.actions.push(action);
    }

    /// Appends an attached requirement.
    pub fn add_requirement(&mut self, requirement: RequirementNode) {
        self.requirements.push(requirement);
    }

    /// Registers a listener for fired targets with sources of type `T`.
    pub fn add_listener<T: Any>(&mut self, listener: Arc<dyn TriggerListener>) {
        self.listeners.push(ListenerEntry {
            target_type: TargetType::of::<T>(),
            listener,
        });
    }

    /// Registers a listener for every fired target.
    pub fn add_any_listener(&mut self, listener: Arc<dyn TriggerListener>) {
        self.listeners.push(ListenerEntry {
            target_type: TargetType::any(),
            listener,
        });
    }

    /// Removes every registration of `listener`; returns true if any existed.
    pub fn remove_listener(&mut self, listener: &Arc<dyn TriggerListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|entry| !Arc::ptr_eq(&entry.listener, listener));
        self.listeners.len() != before
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true when `identifier` names this trigger, ignoring case.
    #[must_use]
    pub fn matches(&self, identifier: &str) -> bool {
        self.identifier.eq_ignore_ascii_case(identifier)
    }
}

// ============================================================================
// SECTION: Firing
// ============================================================================

impl TriggerNode {
    /// Fires the trigger for `identifier` if it matches.
    ///
    /// Builds the root context (owner is this trigger, targets are the
    /// batch) and calls [`TriggerNode::trigger`]. Returns `Ok(None)` when the
    /// identifier does not match.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the deferred batch cannot be scheduled.
    pub fn fire(&self, identifier: &str, targets: &[Target], scope: &Scope) -> Result<Option<FutureResult>, RuntimeError> {
        if !self.matches(identifier) {
            return Ok(None);
        }
        let ctx = ExecutionContext::of(scope.clone(), Some(NodeRef::from(self)), targets.iter().cloned()).next(self);
        self.trigger(targets, &ctx).map(Some)
    }

    /// Processes a batch of targets within `ctx`.
    ///
    /// The returned future settles after the (possibly delayed) batch and
    /// every action it started.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the deferred batch cannot be scheduled.
    pub fn trigger(&self, targets: &[Target], ctx: &ExecutionContext) -> Result<FutureResult, RuntimeError> {
        let future = FutureResult::new();
        match ctx.scope().scheduler() {
            Some(scheduler) if !self.config.delay.is_zero() => {
                let node = self.clone();
                let targets = targets.to_vec();
                let ctx = ctx.clone();
                let pending = future.clone();
                tracing::trace!(node = %self.id, delay = %format_duration(self.config.delay), "trigger batch deferred");
                scheduler.run_later(Box::new(move || node.run_batch(&targets, &ctx, &pending)), self.config.delay)?;
            }
            _ => self.run_batch(targets, ctx, &future),
        }
        Ok(future)
    }

    /// Processes the batch and settles `future`.
    fn run_batch(&self, targets: &[Target], ctx: &ExecutionContext, future: &FutureResult) {
        if ctx.scope().is_vetoed(&VetoEvent::TriggerExecution {
            node: &self.id,
            targets,
        }) {
            tracing::debug!(node = %self.id, "trigger vetoed");
            future.complete_with(EvalResult::cancelled());
            return;
        }

        let mut result = CombinedResult::empty();
        let mut fired = Vec::new();
        let mut actions = Vec::new();
        for target in targets {
            match self.process_target(target, ctx) {
                Ok(TargetOutcome::Skipped(skipped)) => {
                    tracing::debug!(node = %self.id, target = %target.unique_id(), status = %skipped.status(), "trigger target skipped");
                    result = result.combine(skipped);
                }
                Ok(TargetOutcome::Fired {
                    result: outcome,
                    actions: started,
                }) => {
                    fired.push(target.clone());
                    result = result.combine(outcome);
                    actions.extend(started);
                }
                Err(err) => {
                    tracing::warn!(node = %self.id, target = %target.unique_id(), error = %err, "trigger target failed");
                    result = result.combine(self.tag(EvalResult::error().with_message(err.to_string()), target));
                }
            }
        }

        for entry in &self.listeners {
            entry.notify(&self.id, &fired, ctx);
        }

        if actions.is_empty() {
            future.complete_with(result);
            return;
        }
        let future = future.clone();
        FutureResult::join(actions).on_completion(move |nested| {
            future.complete_with(result.combine(nested));
        });
    }

    /// Applies gates, leaf check, requirements and actions for one target.
    fn process_target(&self, target: &Target, ctx: &ExecutionContext) -> Result<TargetOutcome, RuntimeError> {
        if !self.target_type().matches(target) {
            return Ok(TargetOutcome::Skipped(self.tag(EvalResult::empty(), target).into()));
        }
        let scope = ctx.scope();
        let last_execution = scope.load::<i64>(&self.id, target, LAST_EXECUTION)?;
        let gate = CombinedResult::from(
            self.tag(gates::execute_once(NodeKind::Trigger, self.config.execute_once, last_execution), target),
        )
        .combine(self.tag(
            gates::cooldown(NodeKind::Trigger, self.config.cooldown, last_execution, scope.now_millis()),
            target,
        ));
        if !gate.is_success() {
            return Ok(TargetOutcome::Skipped(gate));
        }

        if let Some(behavior) = &self.behavior {
            let check = behavior.invoke(&self.id, target, ctx);
            if !check.is_success() {
                return Ok(TargetOutcome::Skipped(self.tag(check, target).into()));
            }
        }

        let requirements = test_all(&self.requirements, target, ctx)?;
        if !requirements.is_success() {
            return Ok(TargetOutcome::Skipped(requirements));
        }

        scope.store(&self.id, target, LAST_EXECUTION, &scope.now_millis())?;

        let mut started = Vec::new();
        if self.config.execute_actions {
            for action in &self.actions {
                let future = action.execute(target, &ctx.next(action)).unwrap_or_else(|err| {
                    tracing::warn!(node = %action.id(), target = %target.unique_id(), error = %err, "trigger action failed");
                    FutureResult::completed(
                        EvalResult::error().with_message(err.to_string()).for_target(target.clone(), action.id().clone()),
                    )
                });
                started.push(future);
            }
        }
        Ok(TargetOutcome::Fired {
            result: CombinedResult::from(self.tag(EvalResult::success(), target)).combine(requirements),
            actions: started,
        })
    }

    /// Tags a result with this node and `target`.
    fn tag(&self, result: EvalResult, target: &Target) -> TargetResult {
        result.for_target(target.clone(), self.id.clone())
    }
}

impl From<&TriggerNode> for NodeRef {
    fn from(node: &TriggerNode) -> Self {
        Self::new(node.id.clone(), NodeKind::Trigger)
    }
}

impl std::fmt::Debug for TriggerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerNode")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("config", &self.config)
            .field("actions", &self.actions)
            .field("requirements", &self.requirements)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
