// crates/ruleflow-core/src/node/action.rs
// ============================================================================
// Module: Action Nodes
// Description: Action execution with gates, requirements, delay and children.
// Purpose: Run leaf actions and their nested children under runtime policy.
// Dependencies: crate::context, crate::interfaces, crate::node, crate::result
// ============================================================================

//! ## Overview
//! [`ActionNode::execute`] checks, in order: target type (mismatch is
//! EMPTY), the pre-execution veto, the combined execute-once and cooldown
//! gates, then the attached requirements. Only when all pass does it build
//! the body, which runs immediately or after `delay` on the scope's
//! scheduler. Either way a [`FutureResult`] is returned at once.
//!
//! The body consults the execution veto, runs the leaf, stamps
//! `last_execution` unless the leaf errored, and then executes each matching
//! child against a context scoped to that child. The future settles after
//! every child future has settled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;

use crate::context::ExecutionContext;
use crate::context::NodeKind;
use crate::context::NodeRef;
use crate::context::Scope;
use crate::error::RuntimeError;
use crate::identifiers::NodeId;
use crate::interfaces::VetoEvent;
use crate::node::behavior::Action;
use crate::node::behavior::Behavior;
use crate::node::config::ActionConfig;
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
// SECTION: Action Node
// ============================================================================

/// Configured action wrapper with nested children and requirements.
///
/// # Invariants
/// - The identifier is fixed at construction; clones share counters.
/// - Children run strictly after the leaf, in list order.
#[derive(Debug, Clone)]
pub struct ActionNode {
    /// Stable node identifier.
    id: NodeId,
    /// Erased leaf action.
    behavior: Behavior,
    /// Policy config.
    config: ActionConfig,
    /// Nested child actions.
    actions: Vec<Self>,
    /// Requirements checked before the body.
    requirements: Vec<RequirementNode>,
}

impl ActionNode {
    /// Creates an action over sources of type `T`.
    #[must_use]
    pub fn new<T, A>(action: A, config: ActionConfig) -> Self
    where
        T: Any + Send + Sync,
        A: Action<T>,
    {
        Self::from_behavior(Behavior::typed::<T, _>(move |target: &T, ctx: &ExecutionContext| action.execute(target, ctx)), config)
    }

    /// Creates an action that accepts every target.
    #[must_use]
    pub fn any<A>(action: A, config: ActionConfig) -> Self
    where
        A: Action<Target>,
    {
        Self::from_behavior(Behavior::untyped(move |target: &Target, ctx: &ExecutionContext| action.execute(target, ctx)), config)
    }

    /// Builds the node around an erased behavior.
    fn from_behavior(behavior: Behavior, config: ActionConfig) -> Self {
        let id = config.identifier.clone().map_or_else(NodeId::generate, NodeId::new);
        Self {
            id,
            behavior,
            config,
            actions: Vec::new(),
            requirements: Vec::new(),
        }
    }

    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the policy config.
    #[must_use]
    pub const fn config(&self) -> &ActionConfig {
        &self.config
    }

    /// Returns the accepted source type.
    #[must_use]
    pub const fn target_type(&self) -> TargetType {
        self.behavior.target_type()
    }

    /// Returns the nested child actions.
    #[must_use]
    pub fn actions(&self) -> &[Self] {
        &self.actions
    }

    /// Returns the attached requirements.
    #[must_use]
    pub fn requirements(&self) -> &[RequirementNode] {
        &self.requirements
    }

    /// Appends a nested child action.
    pub fn add_action(&mut self, action: Self) {
        self.actions.push(action);
    }

    /// Appends an attached requirement.
    pub fn add_requirement(&mut self, requirement: RequirementNode) {
        self.requirements.push(requirement);
    }

    /// Returns the node with a child action appended.
    #[must_use]
    pub fn with_action(mut self, action: Self) -> Self {
        self.add_action(action);
        self
    }

    /// Returns the node with a requirement appended.
    #[must_use]
    pub fn with_requirement(mut self, requirement: RequirementNode) -> Self {
        self.add_requirement(requirement);
        self
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

impl ActionNode {
    /// Executes the action for `target` within `ctx`.
    ///
    /// `ctx` is expected to be scoped to this node (see
    /// [`ExecutionContext::next`]).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when gate counters cannot be read,
    /// requirement storage fails, or the deferred body cannot be scheduled.
    pub fn execute(&self, target: &Target, ctx: &ExecutionContext) -> Result<FutureResult, RuntimeError> {
        if !self.target_type().matches(target) {
            return Ok(FutureResult::completed(self.tag(EvalResult::empty(), target)));
        }
        let scope = ctx.scope();
        if scope.is_vetoed(&VetoEvent::PreActionExecution {
            node: &self.id,
            target,
        }) {
            tracing::debug!(node = %self.id, target = %target.unique_id(), "action vetoed before execution");
            return Ok(FutureResult::completed(self.tag(EvalResult::cancelled(), target)));
        }

        let last_execution = scope.load::<i64>(&self.id, target, LAST_EXECUTION)?;
        let gate = CombinedResult::from(
            self.tag(gates::execute_once(NodeKind::Action, self.config.execute_once, last_execution), target),
        )
        .combine(self.tag(
            gates::cooldown(NodeKind::Action, self.config.cooldown, last_execution, scope.now_millis()),
            target,
        ));
        if !gate.is_success() {
            tracing::debug!(node = %self.id, target = %target.unique_id(), status = %gate.status(), "action gated");
            return Ok(FutureResult::completed(gate));
        }

        let requirements = test_all(&self.requirements, target, ctx)?;
        if !requirements.is_success() {
            return Ok(FutureResult::completed(requirements));
        }

        let future = FutureResult::new();
        match scope.scheduler() {
            Some(scheduler) if !self.config.delay.is_zero() => {
                let node = self.clone();
                let target = target.clone();
                let ctx = ctx.clone();
                let pending = future.clone();
                tracing::trace!(node = %self.id, delay = %format_duration(self.config.delay), "action body deferred");
                scheduler.run_later(Box::new(move || node.run_body(&target, &ctx, &pending)), self.config.delay)?;
            }
            _ => self.run_body(target, ctx, &future),
        }
        Ok(future)
    }

    /// Executes the action in a fresh root context over `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] under the same conditions as
    /// [`ActionNode::execute`].
    pub fn run(&self, target: &Target, scope: &Scope) -> Result<FutureResult, RuntimeError> {
        let ctx = ExecutionContext::of(scope.clone(), None, [target.clone()]).next(self);
        self.execute(target, &ctx)
    }

    /// Runs the leaf and children, settling `future`.
    fn run_body(&self, target: &Target, ctx: &ExecutionContext, future: &FutureResult) {
        let scope = ctx.scope();
        if scope.is_vetoed(&VetoEvent::ActionExecution {
            node: &self.id,
            target,
        }) {
            tracing::debug!(node = %self.id, target = %target.unique_id(), "action vetoed");
            future.complete_with(self.tag(EvalResult::cancelled(), target));
            return;
        }

        let outcome = self.behavior.invoke(&self.id, target, ctx);
        let cancelled = outcome.status().is_cancelled();
        let mut result = CombinedResult::from(self.tag(outcome.clone(), target));
        if !outcome.is_error()
            && let Err(err) = scope.store(&self.id, target, LAST_EXECUTION, &scope.now_millis())
        {
            tracing::warn!(node = %self.id, target = %target.unique_id(), error = %err, "failed to record execution");
            result = result.combine(self.tag(EvalResult::error().with_message(err.to_string()), target));
        }
        if cancelled {
            future.complete_with(result);
            return;
        }

        let children: Vec<FutureResult> = self
            .actions
            .iter()
            .filter(|child| child.target_type().matches(target))
            .map(|child| {
                child.execute(target, &ctx.next(child)).unwrap_or_else(|err| {
                    tracing::warn!(node = %child.id, target = %target.unique_id(), error = %err, "child action failed");
                    FutureResult::completed(child.tag(EvalResult::error().with_message(err.to_string()), target))
                })
            })
            .collect();
        if children.is_empty() {
            future.complete_with(result);
            return;
        }
        let future = future.clone();
        FutureResult::join(children).on_completion(move |nested| {
            future.complete_with(result.combine(nested));
        });
    }

    /// Tags a result with this node and `target`.
    fn tag(&self, result: EvalResult, target: &Target) -> TargetResult {
        result.for_target(target.clone(), self.id.clone())
    }
}

impl From<&ActionNode> for NodeRef {
    fn from(node: &ActionNode) -> Self {
        Self::new(node.id.clone(), NodeKind::Action)
    }
}
