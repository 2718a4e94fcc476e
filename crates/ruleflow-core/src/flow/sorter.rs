// crates/ruleflow-core/src/flow/sorter.rs
// ============================================================================
// Module: Flow Sorter
// Description: Single-pass nesting of a flat node sequence into root nodes.
// Purpose: Bind requirements and child actions to the roots they belong to.
// Dependencies: crate::node
// ============================================================================

//! ## Overview
//! [`FlowSorter`] scans a flat, ordered node sequence once and produces root
//! nodes (actions and triggers) carrying their requirements and children.
//!
//! Binding rules:
//! - Requirements collect in a pending run and bind to the next action or
//!   trigger. A requirement also ends the current run of children.
//! - An action right after another action (no requirement in between)
//!   becomes its nested child.
//! - Consecutive triggers form a group. Every action that follows an open
//!   group is attached to each trigger of the group; the group closes when a
//!   new trigger follows an action.
//! - A trailing requirement run is kept as flat roots only when no root was
//!   produced at all; otherwise it is dropped.
//!
//! The sorter never fails; empty input yields empty output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::mem;

use crate::node::ActionNode;
use crate::node::FlowNode;
use crate::node::RequirementNode;
use crate::node::TriggerNode;

// ============================================================================
// SECTION: Flow Sorter
// ============================================================================

/// Sorts a flat node sequence into root nodes.
#[must_use]
pub fn sort_flow(nodes: impl IntoIterator<Item = FlowNode>) -> Vec<FlowNode> {
    let mut sorter = FlowSorter::new();
    for node in nodes {
        sorter.push(node);
    }
    sorter.finish()
}

/// Incremental state of the single-pass sort.
#[derive(Debug, Default)]
pub struct FlowSorter {
    /// Completed roots, in order.
    roots: Vec<FlowNode>,
    /// Action currently accepting nested children.
    active_action: Option<ActionNode>,
    /// Open trigger group.
    group: Vec<TriggerNode>,
    /// Requirements shared by the triggers of the open group.
    group_requirements: Vec<RequirementNode>,
    /// Whether an action has been attached to the open group.
    group_sealed: bool,
    /// Requirements waiting for the next action or trigger.
    pending: Vec<RequirementNode>,
}

impl FlowSorter {
    /// Creates an empty sorter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next node of the sequence.
    pub fn push(&mut self, node: FlowNode) {
        match node {
            FlowNode::Requirement(requirement) => self.push_requirement(requirement),
            FlowNode::Action(action) => self.push_action(action),
            FlowNode::Trigger(trigger) => self.push_trigger(trigger),
        }
    }

    /// Completes the sort and returns the roots.
    #[must_use]
    pub fn finish(mut self) -> Vec<FlowNode> {
        self.flush_action();
        self.close_group();
        if !self.pending.is_empty() {
            if self.roots.is_empty() {
                self.roots.extend(self.pending.drain(..).map(FlowNode::Requirement));
            } else {
                tracing::debug!(dropped = self.pending.len(), "trailing requirements have no node to bind to");
            }
        }
        self.roots
    }

    /// Handles a requirement: ends the children run and waits for a root.
    fn push_requirement(&mut self, requirement: RequirementNode) {
        self.flush_action();
        self.pending.push(requirement);
    }

    /// Handles an action: nests it or starts a new children run.
    fn push_action(&mut self, mut action: ActionNode) {
        if self.pending.is_empty()
            && let Some(active) = self.active_action.as_mut()
        {
            active.add_action(action);
            return;
        }
        self.flush_action();
        for requirement in self.pending.drain(..) {
            action.add_requirement(requirement);
        }
        if !self.group.is_empty() {
            self.group_sealed = true;
        }
        self.active_action = Some(action);
    }

    /// Handles a trigger: joins the open group or starts a new one.
    fn push_trigger(&mut self, mut trigger: TriggerNode) {
        let joins_group = !self.group.is_empty() && !self.group_sealed && self.active_action.is_none();
        if joins_group {
            self.group_requirements.append(&mut self.pending);
        } else {
            self.flush_action();
            self.close_group();
            self.group_requirements = mem::take(&mut self.pending);
        }
        for requirement in &self.group_requirements {
            trigger.add_requirement(requirement.clone());
        }
        self.group.push(trigger);
    }

    /// Moves the active action into the open group, or to the roots.
    fn flush_action(&mut self) {
        let Some(action) = self.active_action.take() else {
            return;
        };
        match self.group.split_last_mut() {
            None => self.roots.push(FlowNode::Action(action)),
            Some((last, rest)) => {
                for trigger in rest {
                    trigger.add_action(action.clone());
                }
                last.add_action(action);
            }
        }
    }

    /// Moves the open group's triggers to the roots.
    fn close_group(&mut self) {
        self.roots.extend(self.group.drain(..).map(FlowNode::Trigger));
        self.group_requirements.clear();
        self.group_sealed = false;
    }
}
