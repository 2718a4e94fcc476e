// crates/ruleflow-core/src/node/mod.rs
// ============================================================================
// Module: Node Runtime
// Description: Action, requirement and trigger nodes and their shared contract.
// Purpose: Evaluate configured nodes against targets under runtime policy.
// Dependencies: crate::context, crate::result, crate::target
// ============================================================================

//! ## Overview
//! Nodes wrap a leaf behavior with runtime policy and per-(node, target)
//! counters. [`FlowNode`] is the closed set of node categories; the flow
//! sorter and flow container switch on it exhaustively.

pub mod action;
pub mod behavior;
pub mod config;
pub mod gates;
pub mod requirement;
pub mod trigger;

pub use action::ActionNode;
pub use behavior::Action;
pub use behavior::BehaviorResult;
pub use behavior::Requirement;
pub use behavior::Trigger;
pub use behavior::TriggerListener;
pub use config::ActionConfig;
pub use config::RequirementConfig;
pub use config::TriggerConfig;
pub use requirement::RequirementNode;
pub use trigger::TriggerNode;

use crate::context::NodeKind;
use crate::context::NodeRef;
use crate::identifiers::NodeId;

// ============================================================================
// SECTION: Flow Node
// ============================================================================

/// A node of any category.
#[derive(Debug, Clone)]
pub enum FlowNode {
    /// Requirement node.
    Requirement(RequirementNode),
    /// Action node.
    Action(ActionNode),
    /// Trigger node.
    Trigger(TriggerNode),
}

impl FlowNode {
    /// Returns the node category.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Requirement(_) => NodeKind::Requirement,
            Self::Action(_) => NodeKind::Action,
            Self::Trigger(_) => NodeKind::Trigger,
        }
    }

    /// Returns the node identifier.
    #[must_use]
    pub const fn id(&self) -> &NodeId {
        match self {
            Self::Requirement(node) => node.id(),
            Self::Action(node) => node.id(),
            Self::Trigger(node) => node.id(),
        }
    }

    /// Returns the requirement node, if this is one.
    #[must_use]
    pub const fn as_requirement(&self) -> Option<&RequirementNode> {
        match self {
            Self::Requirement(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the action node, if this is one.
    #[must_use]
    pub const fn as_action(&self) -> Option<&ActionNode> {
        match self {
            Self::Action(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the trigger node, if this is one.
    #[must_use]
    pub const fn as_trigger(&self) -> Option<&TriggerNode> {
        match self {
            Self::Trigger(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the trigger node mutably, if this is one.
    pub const fn as_trigger_mut(&mut self) -> Option<&mut TriggerNode> {
        match self {
            Self::Trigger(node) => Some(node),
            _ => None,
        }
    }
}

impl From<&FlowNode> for NodeRef {
    fn from(node: &FlowNode) -> Self {
        Self::new(node.id().clone(), node.kind())
    }
}

impl From<RequirementNode> for FlowNode {
    fn from(node: RequirementNode) -> Self {
        Self::Requirement(node)
    }
}

impl From<ActionNode> for FlowNode {
    fn from(node: ActionNode) -> Self {
        Self::Action(node)
    }
}

impl From<TriggerNode> for FlowNode {
    fn from(node: TriggerNode) -> Self {
        Self::Trigger(node)
    }
}
