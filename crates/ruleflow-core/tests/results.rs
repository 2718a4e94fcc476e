// crates/ruleflow-core/tests/results.rs
// ============================================================================
// Module: Result Model Tests
// Description: Tests for status combination, combined and future results.
// Purpose: Validate the status table, flattening and settle-once semantics.
// Dependencies: ruleflow_core::result
// ============================================================================
//! ## Overview
//! Validates the status dominance table, combined-result aggregation and the
//! callback behavior of future results.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::sync::Arc;
use std::sync::Mutex;

use ruleflow_core::CombinedResult;
use ruleflow_core::EvalResult;
use ruleflow_core::FutureResult;
use ruleflow_core::NodeId;
use ruleflow_core::ResultEntry;
use ruleflow_core::ResultStatus;
use support::TestResult;
use support::ensure;
use support::fixtures::Monster;
use support::fixtures::Player;
use support::fixtures::monster;
use support::fixtures::player;

use ResultStatus::Cancelled;
use ResultStatus::Empty;
use ResultStatus::Error;
use ResultStatus::Failure;
use ResultStatus::Success;

// ============================================================================
// SECTION: Status Table
// ============================================================================

/// Expected `combine` outcome for every ordered pair.
const TABLE: [(ResultStatus, ResultStatus, ResultStatus); 25] = [
    (Empty, Empty, Empty),
    (Empty, Cancelled, Success),
    (Empty, Success, Success),
    (Empty, Failure, Failure),
    (Empty, Error, Error),
    (Cancelled, Empty, Success),
    (Cancelled, Cancelled, Cancelled),
    (Cancelled, Success, Success),
    (Cancelled, Failure, Failure),
    (Cancelled, Error, Error),
    (Success, Empty, Success),
    (Success, Cancelled, Success),
    (Success, Success, Success),
    (Success, Failure, Failure),
    (Success, Error, Error),
    (Failure, Empty, Failure),
    (Failure, Cancelled, Failure),
    (Failure, Success, Failure),
    (Failure, Failure, Failure),
    (Failure, Error, Error),
    (Error, Empty, Error),
    (Error, Cancelled, Error),
    (Error, Success, Error),
    (Error, Failure, Error),
    (Error, Error, Error),
];

/// Tests the full status combination table.
#[test]
fn test_status_combination_table() -> TestResult {
    for (left, right, expected) in TABLE {
        let actual = left.combine(right);
        ensure(actual == expected, format!("{left} + {right} should be {expected}, got {actual}"))?;
    }
    Ok(())
}

/// Tests which statuses count as success.
#[test]
fn test_status_success_and_negation() -> TestResult {
    ensure(Success.is_success() && Empty.is_success(), "Expected SUCCESS and EMPTY to be successful")?;
    ensure(!Failure.is_success() && !Error.is_success(), "Expected FAILURE and ERROR to fail")?;
    ensure(!Cancelled.is_success(), "Expected CANCELLED to not count as success")?;
    ensure(Success.negate() == Failure && Failure.negate() == Success, "Expected negate to swap outcomes")?;
    for status in [Empty, Cancelled, Error] {
        ensure(status.negate() == status, format!("Expected {status} to pass through negate"))?;
    }
    Ok(())
}

/// Tests the serialized status names.
#[test]
fn test_status_serializes_snake_case() -> TestResult {
    let encoded = serde_json::to_string(&Cancelled)?;
    ensure(encoded == "\"cancelled\"", format!("Unexpected encoding {encoded}"))?;
    let decoded: ResultStatus = serde_json::from_str("\"error\"")?;
    ensure(decoded == Error, "Expected error to decode")?;
    Ok(())
}

// ============================================================================
// SECTION: Combined Results
// ============================================================================

/// Tests homogeneity rules for combined results.
#[test]
fn test_combined_success_and_empty() -> TestResult {
    let mixed = CombinedResult::from(EvalResult::success()).combine(EvalResult::empty());
    ensure(mixed.status() == Success, "Expected SUCCESS + EMPTY to be SUCCESS")?;
    let empties = CombinedResult::from(EvalResult::empty()).combine(EvalResult::empty());
    ensure(empties.status() == Empty, "Expected EMPTY + EMPTY to stay EMPTY")?;
    ensure(CombinedResult::empty().status() == Empty, "Expected an empty combination to be EMPTY")?;
    let cancelled = CombinedResult::from(EvalResult::cancelled()).combine(EvalResult::cancelled());
    ensure(cancelled.status() == Cancelled, "Expected CANCELLED + CANCELLED to stay CANCELLED")?;
    Ok(())
}

/// Tests that combining is non-mutating and always flat.
#[test]
fn test_combined_flattens_and_does_not_mutate() -> TestResult {
    let base = CombinedResult::from(EvalResult::success());
    let inner = CombinedResult::from(EvalResult::failure().with_message("inner"))
        .combine(EvalResult::empty());
    let merged = base.combine(&inner);

    ensure(base.results().len() == 1, "Expected the original to be unchanged")?;
    ensure(merged.results().len() == 3, "Expected nested entries to be flattened")?;
    ensure(merged.status() == Failure, "Expected FAILURE to dominate")?;
    ensure(merged.messages() == ["inner".to_string()], "Expected the inner message to surface")?;
    Ok(())
}

/// Tests that messages keep first-seen order and drop duplicates.
#[test]
fn test_combined_messages_are_deduplicated() -> TestResult {
    let combined = CombinedResult::combine_all([
        EvalResult::failure().with_message("on cooldown"),
        EvalResult::failure().with_message("missing key").with_message("on cooldown"),
        EvalResult::error().with_message("storage down"),
    ]);
    let expected = ["on cooldown", "missing key", "storage down"];
    ensure(combined.messages() == expected, format!("Unexpected messages {:?}", combined.messages()))?;
    ensure(combined.to_result().status() == Error, "Expected the reduced result to be ERROR")?;
    Ok(())
}

/// Tests filtering entries by target and by source type.
#[test]
fn test_combined_filters_by_target() -> TestResult {
    let alice = player("alice", 10);
    let bob = player("bob", 10);
    let wolf = monster("wolf");
    let node = NodeId::new("check");
    let combined = CombinedResult::from_entries([
        ResultEntry::from(EvalResult::success().for_target(alice.clone(), node.clone())),
        ResultEntry::from(EvalResult::failure().for_target(bob.clone(), node.clone())),
        ResultEntry::from(EvalResult::empty().for_target(wolf, node.clone())),
        ResultEntry::from(EvalResult::success()),
    ]);

    let for_bob = combined.of_target(&bob);
    ensure(for_bob.len() == 1, "Expected one entry for bob")?;
    ensure(for_bob[0].status() == Failure, "Expected bob's entry to be FAILURE")?;
    ensure(for_bob[0].clone().into_result() == EvalResult::failure(), "Expected the untagged outcome")?;
    ensure(combined.of_target_type::<Player>().len() == 2, "Expected two player entries")?;
    ensure(combined.of_target_type::<Monster>().len() == 1, "Expected one monster entry")?;
    ensure(combined.of_target(&alice)[0].node() == &node, "Expected the node to be recorded")?;
    Ok(())
}

// ============================================================================
// SECTION: Future Results
// ============================================================================

/// Tests that a future settles exactly once.
#[test]
fn test_future_settles_once() -> TestResult {
    let future = FutureResult::new();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&calls);
    future.on_completion(move |result| recorded.lock().unwrap().push(result.status()));

    ensure(!future.is_complete(), "Expected a new future to be pending")?;
    let first = future.complete_with(EvalResult::failure().with_message("first"));
    let second = future.complete_with(EvalResult::success());
    ensure(first == second, "Expected repeat completion to return the frozen result")?;
    ensure(future.status() == Failure, "Expected the first completion to win")?;
    ensure(*calls.lock().unwrap() == vec![Failure], "Expected exactly one callback call")?;
    ensure(future.pending_callbacks() == 0, "Expected callbacks to be drained")?;
    Ok(())
}

/// Tests that callbacks run in registration order.
#[test]
fn test_future_callbacks_in_order() -> TestResult {
    let future = FutureResult::pending(EvalResult::success());
    let order = Arc::new(Mutex::new(Vec::new()));
    for index in 0 .. 3 {
        let order = Arc::clone(&order);
        future.on_completion(move |_| order.lock().unwrap().push(index));
    }
    let _ = future.complete();
    ensure(*order.lock().unwrap() == vec![0, 1, 2], "Expected registration order")?;
    Ok(())
}

/// Tests registering a callback on a settled future.
#[test]
fn test_future_late_callback_fires_immediately() -> TestResult {
    let future = FutureResult::completed(EvalResult::success());
    let hits = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&hits);
    future.on_completion(move |_| *counter.lock().unwrap() += 1);
    ensure(*hits.lock().unwrap() == 1, "Expected the late callback to fire at once")?;
    let _ = future.complete();
    ensure(*hits.lock().unwrap() == 1, "Expected no second call")?;
    Ok(())
}

/// Tests that combine returns a new future carrying callbacks.
#[test]
fn test_future_combine_carries_callbacks() -> TestResult {
    let original = FutureResult::pending(EvalResult::success());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&seen);
    original.on_completion(move |result| recorded.lock().unwrap().push(result.status()));

    let combined = original.combine(EvalResult::failure());
    ensure(combined.pending_callbacks() == 1, "Expected the callback to be carried")?;
    let _ = combined.complete();
    ensure(!original.is_complete(), "Expected the original future to stay pending")?;
    ensure(*seen.lock().unwrap() == vec![Failure], "Expected the carried callback to see the merged result")?;

    let other = FutureResult::pending(EvalResult::error());
    other.on_completion(|_| {});
    let merged = FutureResult::pending(EvalResult::success()).combine_future(&other);
    ensure(merged.pending_callbacks() == 1, "Expected callbacks of the other future")?;
    ensure(merged.complete().status() == Error, "Expected the other future's result to merge")?;
    Ok(())
}

/// Tests joining futures.
#[test]
fn test_future_join_waits_for_all() -> TestResult {
    let first = FutureResult::new();
    let second = FutureResult::new();
    let joined = FutureResult::join(vec![first.clone(), second.clone()]);

    let _ = second.complete_with(EvalResult::failure().with_message("second"));
    ensure(!joined.is_complete(), "Expected join to wait for every input")?;
    let _ = first.complete_with(EvalResult::success());
    ensure(joined.is_complete(), "Expected join to settle after the last input")?;
    ensure(joined.status() == Failure, "Expected the joined status to combine inputs")?;
    ensure(joined.result().results().len() == 2, "Expected both entries")?;

    let none = FutureResult::join(Vec::new());
    ensure(none.is_complete() && none.status() == Empty, "Expected an empty join to settle EMPTY")?;
    Ok(())
}
