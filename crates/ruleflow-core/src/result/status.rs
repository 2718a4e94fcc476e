// crates/ruleflow-core/src/result/status.rs
// ============================================================================
// Module: Result Status
// Description: Five-valued outcome status and its combination table.
// Purpose: Provide the status algebra shared by every evaluation result.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`ResultStatus`] is the outcome of a single evaluation step. Statuses
//! combine with a dominance table: ERROR beats everything, FAILURE beats
//! the rest, and EMPTY or CANCELLED only survive when both sides agree.
//! Any other mix collapses to SUCCESS.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Result Status
// ============================================================================

/// Outcome status of an evaluation step.
///
/// # Invariants
/// - `Success` and `Empty` count as success; every other status does not.
/// - [`ResultStatus::combine`] is commutative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// Nothing was applicable; vacuously successful.
    #[default]
    Empty,
    /// Execution was vetoed before completion.
    Cancelled,
    /// The evaluation succeeded.
    Success,
    /// A well-formed negative outcome.
    Failure,
    /// An unexpected fault while evaluating.
    Error,
}

impl ResultStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 5] = [Self::Empty, Self::Cancelled, Self::Success, Self::Failure, Self::Error];

    /// Combines two statuses using the dominance table.
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Error, _) | (_, Self::Error) => Self::Error,
            (Self::Failure, _) | (_, Self::Failure) => Self::Failure,
            (Self::Empty, Self::Empty) => Self::Empty,
            (Self::Cancelled, Self::Cancelled) => Self::Cancelled,
            _ => Self::Success,
        }
    }

    /// Maps a boolean onto `Success` or `Failure`.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Success } else { Self::Failure }
    }

    /// Returns true for `Success` and `Empty`.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Empty)
    }

    /// Returns true for `Failure` only.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failure)
    }

    /// Returns true for `Error` only.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns true for `Cancelled` only.
    #[must_use]
    pub const fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Swaps `Success` and `Failure`; other statuses pass through.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Success => Self::Failure,
            Self::Failure => Self::Success,
            other => other,
        }
    }

    /// Returns the stable lowercase label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Cancelled => "cancelled",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
