// crates/ruleflow-core/src/result/future.rs
// ============================================================================
// Module: Future Results
// Description: Shared, settle-once handle to a result still being produced.
// Purpose: Report outcomes of bodies that may run later on a scheduler.
// Dependencies: crate::result
// ============================================================================

//! ## Overview
//! A [`FutureResult`] is returned by every action execution, whether the body
//! ran synchronously or was deferred. Before settlement it exposes the
//! in-flight aggregation; [`FutureResult::complete`] freezes it and fires the
//! registered callbacks exactly once, in registration order.
//!
//! Clones share state: completing any clone settles all of them. The
//! combinators ([`FutureResult::combine`], [`FutureResult::combine_future`])
//! instead return a fresh, unsettled future that inherits the callbacks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::result::combined::CombinedResult;
use crate::result::status::ResultStatus;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Callback invoked with the frozen result when a future settles.
pub type CompletionCallback = Arc<dyn Fn(&CombinedResult) + Send + Sync>;

/// Mutable state shared by every clone of a future.
struct FutureState {
    /// Aggregated result so far; frozen once complete.
    result: CombinedResult,
    /// Whether the future has settled.
    complete: bool,
    /// Callbacks awaiting settlement, in registration order.
    callbacks: Vec<CompletionCallback>,
}

/// Result that settles at most once.
///
/// # Invariants
/// - Settles exactly once; later completions return the frozen result.
/// - Callbacks registered before settlement fire once, in order.
#[derive(Clone)]
pub struct FutureResult {
    /// Shared state.
    state: Arc<Mutex<FutureState>>,
}

// ============================================================================
// SECTION: Construction
// ============================================================================

impl FutureResult {
    /// Creates an unsettled future with an empty in-flight result.
    #[must_use]
    pub fn new() -> Self {
        Self::pending(CombinedResult::empty())
    }

    /// Creates an unsettled future seeded with `result`.
    #[must_use]
    pub fn pending(result: impl Into<CombinedResult>) -> Self {
        Self::from_state(result.into(), Vec::new())
    }

    /// Creates an already settled future.
    #[must_use]
    pub fn completed(result: impl Into<CombinedResult>) -> Self {
        let future = Self::pending(result);
        future.complete();
        future
    }

    /// Builds a future around explicit state.
    fn from_state(result: CombinedResult, callbacks: Vec<CompletionCallback>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FutureState {
                result,
                complete: false,
                callbacks,
            })),
        }
    }

    /// Locks the shared state, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, FutureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a future that settles once every input has settled.
    ///
    /// The joined result combines the inputs' results in input order. An empty
    /// input yields an already settled future.
    #[must_use]
    pub fn join(futures: Vec<Self>) -> Self {
        let joined = Self::new();
        if futures.is_empty() {
            joined.complete();
            return joined;
        }
        let remaining = Arc::new(AtomicUsize::new(futures.len()));
        let slots: Arc<Mutex<Vec<Option<CombinedResult>>>> = Arc::new(Mutex::new(vec![None; futures.len()]));
        for (index, future) in futures.iter().enumerate() {
            let joined = joined.clone();
            let remaining = Arc::clone(&remaining);
            let slots = Arc::clone(&slots);
            future.on_completion(move |result| {
                {
                    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(result.clone());
                    }
                }
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let combined = {
                        let slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
                        CombinedResult::combine_all(slots.iter().flatten())
                    };
                    joined.complete_with(combined);
                }
            });
        }
        joined
    }
}

impl Default for FutureResult {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SECTION: Settlement
// ============================================================================

impl FutureResult {
    /// Settles the future and fires pending callbacks.
    ///
    /// Repeated calls are no-ops returning the frozen result.
    pub fn complete(&self) -> CombinedResult {
        self.settle(None)
    }

    /// Folds `result` into the in-flight result, then settles.
    ///
    /// When already settled, `result` is ignored and the frozen result is
    /// returned.
    pub fn complete_with(&self, result: impl Into<CombinedResult>) -> CombinedResult {
        self.settle(Some(result.into()))
    }

    /// Shared settlement path; callbacks run outside the lock.
    fn settle(&self, addition: Option<CombinedResult>) -> CombinedResult {
        let (result, callbacks) = {
            let mut state = self.lock();
            if state.complete {
                return state.result.clone();
            }
            if let Some(addition) = addition {
                state.result = state.result.combine(addition);
            }
            state.complete = true;
            (state.result.clone(), std::mem::take(&mut state.callbacks))
        };
        for callback in callbacks {
            callback(&result);
        }
        result
    }

    /// Registers a callback for settlement.
    ///
    /// If the future has already settled, the callback runs immediately with
    /// the frozen result.
    pub fn on_completion<F>(&self, callback: F)
    where
        F: Fn(&CombinedResult) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        if !state.complete {
            state.callbacks.push(Arc::new(callback));
            return;
        }
        let result = state.result.clone();
        drop(state);
        callback(&result);
    }
}

// ============================================================================
// SECTION: Combinators
// ============================================================================

impl FutureResult {
    /// Returns a new unsettled future with `result` folded in.
    ///
    /// The new future carries this future's pending callbacks.
    #[must_use]
    pub fn combine(&self, result: impl Into<CombinedResult>) -> Self {
        let state = self.lock();
        let merged = state.result.combine(result);
        Self::from_state(merged, state.callbacks.clone())
    }

    /// Returns a new unsettled future merging both results and callbacks.
    #[must_use]
    pub fn combine_future(&self, other: &Self) -> Self {
        if Arc::ptr_eq(&self.state, &other.state) {
            return self.combine(CombinedResult::empty());
        }
        let (other_result, other_callbacks) = {
            let other = other.lock();
            (other.result.clone(), other.callbacks.clone())
        };
        let state = self.lock();
        let mut callbacks = state.callbacks.clone();
        callbacks.extend(other_callbacks);
        Self::from_state(state.result.combine(other_result), callbacks)
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

impl FutureResult {
    /// Returns true once the future has settled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    /// Returns the frozen result, or the in-flight result before settlement.
    #[must_use]
    pub fn result(&self) -> CombinedResult {
        self.lock().result.clone()
    }

    /// Returns the current status of [`FutureResult::result`].
    #[must_use]
    pub fn status(&self) -> ResultStatus {
        self.lock().result.status()
    }

    /// Returns the current messages of [`FutureResult::result`].
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.lock().result.messages().to_vec()
    }

    /// Returns true when the current status is success or empty.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Returns the number of callbacks awaiting settlement.
    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.lock().callbacks.len()
    }
}

impl fmt::Debug for FutureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("FutureResult")
            .field("complete", &state.complete)
            .field("result", &state.result)
            .field("callbacks", &state.callbacks.len())
            .finish()
    }
}
