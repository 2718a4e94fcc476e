// crates/ruleflow-core/src/result/outcome.rs
// ============================================================================
// Module: Evaluation Outcomes
// Description: Plain and target-tagged evaluation results.
// Purpose: Carry a status with its diagnostic messages through the runtime.
// Dependencies: crate::identifiers, crate::target
// ============================================================================

//! ## Overview
//! [`EvalResult`] is an immutable status plus ordered messages.
//! [`TargetResult`] tags one with the target it was produced for and the node
//! that produced it. [`ResultEntry`] is the flattened element stored inside a
//! [`CombinedResult`](crate::CombinedResult).

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::identifiers::NodeId;
use crate::result::status::ResultStatus;
use crate::target::Target;

// ============================================================================
// SECTION: Eval Result
// ============================================================================

/// Immutable outcome of a single evaluation step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvalResult {
    /// Outcome status.
    status: ResultStatus,
    /// Diagnostic messages, in production order.
    messages: Vec<String>,
}

impl EvalResult {
    /// Creates a result with the given status and messages.
    #[must_use]
    pub const fn new(status: ResultStatus, messages: Vec<String>) -> Self {
        Self {
            status,
            messages,
        }
    }

    /// Creates a message-less result with the given status.
    #[must_use]
    pub const fn of_status(status: ResultStatus) -> Self {
        Self::new(status, Vec::new())
    }

    /// Successful result.
    #[must_use]
    pub const fn success() -> Self {
        Self::of_status(ResultStatus::Success)
    }

    /// Failed result.
    #[must_use]
    pub const fn failure() -> Self {
        Self::of_status(ResultStatus::Failure)
    }

    /// Vacuous result.
    #[must_use]
    pub const fn empty() -> Self {
        Self::of_status(ResultStatus::Empty)
    }

    /// Errored result.
    #[must_use]
    pub const fn error() -> Self {
        Self::of_status(ResultStatus::Error)
    }

    /// Cancelled result.
    #[must_use]
    pub const fn cancelled() -> Self {
        Self::of_status(ResultStatus::Cancelled)
    }

    /// Success when `value` is true, failure otherwise.
    #[must_use]
    pub const fn of_bool(value: bool) -> Self {
        Self::of_status(ResultStatus::from_bool(value))
    }

    /// Returns the result with `message` appended.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Returns the result with its status replaced and messages kept.
    #[must_use]
    pub fn with_status(self, status: ResultStatus) -> Self {
        Self::new(status, self.messages)
    }

    /// Tags the result with a target and the producing node.
    #[must_use]
    pub const fn for_target(self, target: Target, node: NodeId) -> TargetResult {
        TargetResult {
            result: self,
            target,
            node,
        }
    }

    /// Returns the outcome status.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        self.status
    }

    /// Returns the diagnostic messages.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns true for success or empty outcomes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true for failure outcomes.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// Returns true for error outcomes.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status.is_error()
    }
}

// ============================================================================
// SECTION: Target Result
// ============================================================================

/// Result tagged with the target it concerns and the node that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResult {
    /// Underlying outcome.
    result: EvalResult,
    /// Target the outcome was produced for.
    target: Target,
    /// Node that produced the outcome.
    node: NodeId,
}

impl TargetResult {
    /// Returns the underlying outcome.
    #[must_use]
    pub const fn result(&self) -> &EvalResult {
        &self.result
    }

    /// Returns the target the outcome was produced for.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// Returns the producing node.
    #[must_use]
    pub const fn node(&self) -> &NodeId {
        &self.node
    }

    /// Returns the outcome status.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        self.result.status
    }

    /// Returns the diagnostic messages.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.result.messages
    }

    /// Returns true for success or empty outcomes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// Discards the tags and returns the underlying outcome.
    #[must_use]
    pub fn into_result(self) -> EvalResult {
        self.result
    }
}

// ============================================================================
// SECTION: Result Entry
// ============================================================================

/// Flattened element of a combined result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEntry {
    /// Untagged outcome.
    Plain(EvalResult),
    /// Target-tagged outcome.
    Target(TargetResult),
}

impl ResultEntry {
    /// Returns the entry's outcome status.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        match self {
            Self::Plain(result) => result.status(),
            Self::Target(result) => result.status(),
        }
    }

    /// Returns the entry's messages.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Plain(result) => result.messages(),
            Self::Target(result) => result.messages(),
        }
    }

    /// Returns the tagged result, if this entry carries one.
    #[must_use]
    pub const fn as_target(&self) -> Option<&TargetResult> {
        match self {
            Self::Plain(_) => None,
            Self::Target(result) => Some(result),
        }
    }
}

impl From<EvalResult> for ResultEntry {
    fn from(value: EvalResult) -> Self {
        Self::Plain(value)
    }
}

impl From<TargetResult> for ResultEntry {
    fn from(value: TargetResult) -> Self {
        Self::Target(value)
    }
}
