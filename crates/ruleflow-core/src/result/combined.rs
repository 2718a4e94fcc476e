// crates/ruleflow-core/src/result/combined.rs
// ============================================================================
// Module: Combined Results
// Description: Flat, ordered aggregation of evaluation outcomes.
// Purpose: Compose node, child and per-target outcomes without nesting.
// Dependencies: crate::result, crate::target
// ============================================================================

//! ## Overview
//! A [`CombinedResult`] holds an ordered, always-flat list of
//! [`ResultEntry`] values. Its status and messages are derived lazily by
//! reducing the entries: statuses through [`ResultStatus::combine`] starting
//! from EMPTY, messages by ordered de-duplication. Combining never mutates;
//! it returns a new value whose list is the old list followed by the
//! flattened argument.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::sync::OnceLock;

use crate::result::outcome::EvalResult;
use crate::result::outcome::ResultEntry;
use crate::result::outcome::TargetResult;
use crate::result::status::ResultStatus;
use crate::target::Target;

// ============================================================================
// SECTION: Combined Result
// ============================================================================

/// Ordered aggregation of evaluation outcomes.
///
/// # Invariants
/// - Entries never contain another combined result.
/// - With no entries the status is EMPTY and there are no messages.
#[derive(Debug, Clone, Default)]
pub struct CombinedResult {
    /// Flattened entries in combination order.
    entries: Vec<ResultEntry>,
    /// Lazily reduced status.
    status: OnceLock<ResultStatus>,
    /// Lazily de-duplicated messages.
    messages: OnceLock<Vec<String>>,
}

impl CombinedResult {
    /// Creates a combined result with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a combined result from already flat entries.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = ResultEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            status: OnceLock::new(),
            messages: OnceLock::new(),
        }
    }

    /// Returns a new combined result with `other` appended and flattened.
    #[must_use]
    pub fn combine(&self, other: impl Into<Self>) -> Self {
        let other = other.into();
        let mut entries = Vec::with_capacity(self.entries.len() + other.entries.len());
        entries.extend(self.entries.iter().cloned());
        entries.extend(other.entries);
        Self::from_entries(entries)
    }

    /// Folds every item into one combined result, in order.
    #[must_use]
    pub fn combine_all<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Self>,
    {
        Self::from_entries(items.into_iter().flat_map(|item| item.into().entries))
    }

    /// Returns the flattened entries.
    #[must_use]
    pub fn results(&self) -> &[ResultEntry] {
        &self.entries
    }

    /// Returns the reduced status (EMPTY when there are no entries).
    #[must_use]
    pub fn status(&self) -> ResultStatus {
        *self.status.get_or_init(|| {
            self.entries.iter().map(ResultEntry::status).reduce(ResultStatus::combine).unwrap_or_default()
        })
    }

    /// Returns the union of entry messages, first occurrence first.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        self.messages.get_or_init(|| {
            let mut messages: Vec<String> = Vec::new();
            for message in self.entries.iter().flat_map(ResultEntry::messages) {
                if !messages.contains(message) {
                    messages.push(message.clone());
                }
            }
            messages
        })
    }

    /// Returns true when the reduced status is success or empty.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Returns true when the reduced status is failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status().is_failure()
    }

    /// Returns true when the reduced status is error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status().is_error()
    }

    /// Returns true when no entries have been combined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collapses the aggregation into a single plain result.
    #[must_use]
    pub fn to_result(&self) -> EvalResult {
        EvalResult::new(self.status(), self.messages().to_vec())
    }

    /// Returns the tagged entries produced for `target`.
    #[must_use]
    pub fn of_target(&self, target: &Target) -> Vec<&TargetResult> {
        self.target_results().filter(|result| result.target() == target).collect()
    }

    /// Returns the tagged entries whose target source is of type `T`.
    #[must_use]
    pub fn of_target_type<T: Any>(&self) -> Vec<&TargetResult> {
        self.target_results().filter(|result| result.target().is_target_type::<T>()).collect()
    }

    /// Iterates over the tagged entries.
    fn target_results(&self) -> impl Iterator<Item = &TargetResult> {
        self.entries.iter().filter_map(ResultEntry::as_target)
    }
}

impl From<EvalResult> for CombinedResult {
    fn from(value: EvalResult) -> Self {
        Self::from_entries([ResultEntry::Plain(value)])
    }
}

impl From<TargetResult> for CombinedResult {
    fn from(value: TargetResult) -> Self {
        Self::from_entries([ResultEntry::Target(value)])
    }
}

impl From<ResultEntry> for CombinedResult {
    fn from(value: ResultEntry) -> Self {
        Self::from_entries([value])
    }
}

impl From<&CombinedResult> for CombinedResult {
    fn from(value: &CombinedResult) -> Self {
        value.clone()
    }
}

impl PartialEq for CombinedResult {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for CombinedResult {}
