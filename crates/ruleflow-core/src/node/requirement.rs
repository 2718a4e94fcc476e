// crates/ruleflow-core/src/node/requirement.rs
// ============================================================================
// Module: Requirement Nodes
// Description: Requirement evaluation with check-once, count and negate policy.
// Purpose: Gate actions and triggers on per-target conditions.
// Dependencies: crate::context, crate::node, crate::result
// ============================================================================

//! ## Overview
//! [`RequirementNode::test`] evaluates in a fixed order:
//! 1. a target of the wrong type is vacuous (EMPTY);
//! 2. with check-once, a cached outcome is returned as-is;
//! 3. the leaf runs;
//! 4. a successful outcome increments the persisted `count` counter;
//! 5. with check-once, the outcome is cached (errors are not cached);
//! 6. a count threshold is combined with the outcome, so a failing or
//!    erroring check still fails even once the threshold is reached;
//! 7. negation swaps SUCCESS and FAILURE.

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
use crate::node::behavior::Behavior;
use crate::node::behavior::Requirement;
use crate::node::config::RequirementConfig;
use crate::node::gates::CHECK_ONCE_RESULT;
use crate::node::gates::COUNT;
use crate::result::CombinedResult;
use crate::result::EvalResult;
use crate::result::ResultStatus;
use crate::result::TargetResult;
use crate::target::Target;
use crate::target::TargetType;

// ============================================================================
// SECTION: Requirement Node
// ============================================================================

/// Configured requirement wrapper.
///
/// # Invariants
/// - The identifier is fixed at construction; clones share counters.
#[derive(Debug, Clone)]
pub struct RequirementNode {
    /// Stable node identifier.
    id: NodeId,
    /// Erased leaf check.
    behavior: Behavior,
    /// Policy config.
    config: RequirementConfig,
}

impl RequirementNode {
    /// Creates a requirement over sources of type `T`.
    #[must_use]
    pub fn new<T, R>(requirement: R, config: RequirementConfig) -> Self
    where
        T: Any + Send + Sync,
        R: Requirement<T>,
    {
        Self::from_behavior(Behavior::typed::<T, _>(move |target: &T, ctx: &ExecutionContext| requirement.test(target, ctx)), config)
    }

    /// Creates a requirement that accepts every target.
    #[must_use]
    pub fn any<R>(requirement: R, config: RequirementConfig) -> Self
    where
        R: Requirement<Target>,
    {
        Self::from_behavior(Behavior::untyped(move |target: &Target, ctx: &ExecutionContext| requirement.test(target, ctx)), config)
    }

    /// Builds the node around an erased behavior.
    fn from_behavior(behavior: Behavior, config: RequirementConfig) -> Self {
        let id = config.identifier.clone().map_or_else(NodeId::generate, NodeId::new);
        Self {
            id,
            behavior,
            config,
        }
    }

    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the policy config.
    #[must_use]
    pub const fn config(&self) -> &RequirementConfig {
        &self.config
    }

    /// Returns the accepted source type.
    #[must_use]
    pub const fn target_type(&self) -> TargetType {
        self.behavior.target_type()
    }

    /// Tests the requirement for `target` within `ctx`.
    ///
    /// `ctx` is expected to be scoped to this node (see
    /// [`ExecutionContext::next`]).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when counter storage fails.
    pub fn test(&self, target: &Target, ctx: &ExecutionContext) -> Result<TargetResult, RuntimeError> {
        if !self.target_type().matches(target) {
            return Ok(self.tag(EvalResult::empty(), target));
        }
        let scope = ctx.scope();
        if self.config.check_once
            && let Some(cached) = scope.load::<bool>(&self.id, target, CHECK_ONCE_RESULT)?
        {
            return Ok(self.tag(EvalResult::of_bool(cached), target));
        }

        let result = self.behavior.invoke(&self.id, target, ctx);

        let mut count = scope.load::<u64>(&self.id, target, COUNT)?.unwrap_or(0);
        if result.is_success() {
            count = count.saturating_add(1);
            scope.store(&self.id, target, COUNT, &count)?;
        }
        if self.config.check_once && !result.is_error() {
            scope.store(&self.id, target, CHECK_ONCE_RESULT, &result.is_success())?;
        }

        let result = if self.config.count > 0 {
            let status = ResultStatus::from_bool(count >= self.config.count).combine(result.status());
            result.with_status(status)
        } else {
            result
        };
        let result = if self.config.negate {
            let status = result.status().negate();
            result.with_status(status)
        } else {
            result
        };
        if !result.is_success() {
            tracing::debug!(node = %self.id, target = %target.unique_id(), status = %result.status(), "requirement not met");
        }
        Ok(self.tag(result, target))
    }

    /// Tests the requirement in a fresh root context over `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when counter storage fails.
    pub fn check(&self, target: &Target, scope: &Scope) -> Result<TargetResult, RuntimeError> {
        let ctx = ExecutionContext::of(scope.clone(), None, [target.clone()]).next(self);
        self.test(target, &ctx)
    }

    /// Tags a result with this node and `target`.
    fn tag(&self, result: EvalResult, target: &Target) -> TargetResult {
        result.for_target(target.clone(), self.id.clone())
    }
}

impl From<&RequirementNode> for NodeRef {
    fn from(node: &RequirementNode) -> Self {
        Self::new(node.id.clone(), NodeKind::Requirement)
    }
}

// ============================================================================
// SECTION: Requirement Lists
// ============================================================================

/// Tests every requirement for `target`, each in its own scoped context.
///
/// All requirements are evaluated so that every failure reason surfaces.
pub(crate) fn test_all(
    requirements: &[RequirementNode],
    target: &Target,
    ctx: &ExecutionContext,
) -> Result<CombinedResult, RuntimeError> {
    let mut combined = CombinedResult::empty();
    for requirement in requirements {
        combined = combined.combine(requirement.test(target, &ctx.next(requirement))?);
    }
    Ok(combined)
}
