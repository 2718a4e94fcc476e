// crates/ruleflow-core/src/flow/mod.rs
// ============================================================================
// Module: Flows
// Description: Sorted node trees ready for repeated evaluation.
// Purpose: Own the roots produced by the sorter and evaluate them by category.
// Dependencies: crate::context, crate::node, crate::result
// ============================================================================

//! ## Overview
//! A [`Flow`] is the output of the flow sorter. Its roots are actions and
//! triggers, except for a flow made only of requirements, whose roots are
//! those requirements. Each category has its own entry point:
//! [`Flow::test`] for requirement roots, [`Flow::execute`] for action roots
//! and [`Flow::fire`] for trigger roots.

pub mod parser;
pub mod sorter;

pub use parser::FlowParseError;
pub use parser::FlowParser;
pub use parser::LineError;
pub use parser::NodeFactory;
pub use sorter::FlowSorter;
pub use sorter::sort_flow;

use crate::context::Scope;
use crate::error::RuntimeError;
use crate::node::FlowNode;
use crate::node::TriggerNode;
use crate::result::CombinedResult;
use crate::result::FutureResult;
use crate::target::Target;

// ============================================================================
// SECTION: Flow
// ============================================================================

/// Sorted tree of nodes.
#[derive(Debug, Clone, Default)]
pub struct Flow {
    /// Root nodes in script order.
    roots: Vec<FlowNode>,
}

impl Flow {
    /// Sorts a flat node sequence into a flow.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = FlowNode>) -> Self {
        Self {
            roots: sort_flow(nodes),
        }
    }

    /// Returns the root nodes.
    #[must_use]
    pub fn roots(&self) -> &[FlowNode] {
        &self.roots
    }

    /// Consumes the flow and returns its roots.
    #[must_use]
    pub fn into_roots(self) -> Vec<FlowNode> {
        self.roots
    }

    /// Returns the number of roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns true when the flow has no roots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Iterates mutably over trigger roots, e.g. to register listeners.
    pub fn triggers_mut(&mut self) -> impl Iterator<Item = &mut TriggerNode> {
        self.roots.iter_mut().filter_map(FlowNode::as_trigger_mut)
    }

    /// Tests every requirement root against `target`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when counter storage fails.
    pub fn test(&self, target: &Target, scope: &Scope) -> Result<CombinedResult, RuntimeError> {
        let mut combined = CombinedResult::empty();
        for requirement in self.roots.iter().filter_map(FlowNode::as_requirement) {
            combined = combined.combine(requirement.check(target, scope)?);
        }
        Ok(combined)
    }

    /// Executes every action root for `target`.
    ///
    /// The returned future settles once every root's future has settled.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when a root cannot start.
    pub fn execute(&self, target: &Target, scope: &Scope) -> Result<FutureResult, RuntimeError> {
        let futures = self
            .roots
            .iter()
            .filter_map(FlowNode::as_action)
            .map(|action| action.run(target, scope))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FutureResult::join(futures))
    }

    /// Fires every trigger root matching `identifier` with `targets`.
    ///
    /// The returned future settles once every fired trigger has settled; it
    /// is already settled and EMPTY when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when a trigger batch cannot be scheduled.
    pub fn fire(&self, identifier: &str, targets: &[Target], scope: &Scope) -> Result<FutureResult, RuntimeError> {
        let mut futures = Vec::new();
        for trigger in self.roots.iter().filter_map(FlowNode::as_trigger) {
            if let Some(future) = trigger.fire(identifier, targets, scope)? {
                futures.push(future);
            }
        }
        Ok(FutureResult::join(futures))
    }
}
