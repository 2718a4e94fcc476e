// crates/ruleflow-core/tests/context.rs
// ============================================================================
// Module: Execution Context Tests
// Description: Tests for chain views, shared scratch state and counter keys.
// Purpose: Validate that derived views share state and scope storage per node.
// Dependencies: ruleflow_core::context, ruleflow_core::runtime
// ============================================================================
//! ## Overview
//! Validates `ExecutionContext::next` history handling, shared scratch data,
//! node-scoped counter storage and the in-memory storage backend.

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

use ruleflow_core::ExecutionContext;
use ruleflow_core::MemoryStorage;
use ruleflow_core::NodeId;
use ruleflow_core::NodeKind;
use ruleflow_core::NodeRef;
use ruleflow_core::Scope;
use ruleflow_core::Storage;
use ruleflow_core::context::storage_key;
use serde_json::json;
use support::TestResult;
use support::ensure;
use support::fixtures::player;

/// Builds a node reference of the given kind.
fn node(id: &str, kind: NodeKind) -> NodeRef {
    NodeRef::new(NodeId::new(id), kind)
}

// ============================================================================
// SECTION: Chain Views
// ============================================================================

/// Tests that next pushes the previous current node onto history.
#[test]
fn test_next_builds_history() -> TestResult {
    let root = ExecutionContext::of(Scope::in_memory(), Some(node("t", NodeKind::Trigger)), [player("alice", 5)]);
    ensure(root.current().is_none(), "Expected a root view without a current node")?;

    let trigger = root.next(node("t", NodeKind::Trigger));
    ensure(trigger.history().is_empty(), "Expected no history after the first step")?;
    let action = trigger.next(node("a", NodeKind::Action));
    let child = action.next(node("b", NodeKind::Action));

    let history: Vec<String> = child.history().iter().map(|entry| entry.id.to_string()).collect();
    ensure(history == ["t", "a"], format!("Unexpected history {history:?}"))?;
    ensure(child.parent().map(|parent| parent.id) == Some(NodeId::new("a")), "Expected parent to be a")?;
    ensure(child.current().map(|current| current.kind) == Some(NodeKind::Action), "Expected child scoped to b")?;
    ensure(child.root().map(|owner| owner.kind) == Some(NodeKind::Trigger), "Expected the root owner to carry")?;
    ensure(root.history().len() == 2, "Expected history to be shared with the root view")?;
    Ok(())
}

/// Tests that scratch data and targets are shared across derived views.
#[test]
fn test_views_share_data_and_targets() -> TestResult {
    let root = ExecutionContext::of(Scope::in_memory(), None, [player("alice", 5)]);
    let child = root.next(node("a", NodeKind::Action));

    let previous = child.set_data("damage", json!(12));
    ensure(previous.is_none(), "Expected no previous scratch value")?;
    ensure(root.data("damage") == Some(json!(12)), "Expected scratch data visible from the root")?;

    root.add_target(player("bob", 3));
    root.add_target(player("alice", 99));
    let ids: Vec<String> = child.targets().iter().map(|target| target.unique_id().to_string()).collect();
    ensure(ids == ["alice", "bob"], format!("Expected deduplicated targets, got {ids:?}"))?;
    Ok(())
}

// ============================================================================
// SECTION: Counter Storage
// ============================================================================

/// Tests that counters are keyed by node, target and key.
#[test]
fn test_store_uses_node_target_key() -> TestResult {
    let storage = Arc::new(MemoryStorage::new());
    let scope = Scope::new(Arc::clone(&storage) as Arc<dyn Storage>);
    let alice = player("alice", 5);
    let ctx = ExecutionContext::of(scope, None, [alice.clone()]).next(node("heal", NodeKind::Action));

    ctx.store(&alice, "count", &3_u64)?;
    ensure(storage.keys()? == ["heal#alice#count"], "Expected the node#target#key layout")?;
    ensure(ctx.load::<u64>(&alice, "count")? == Some(3), "Expected the stored counter back")?;
    ensure(
        storage_key(&NodeId::new("heal"), &alice, "count") == "heal#alice#count",
        "Expected storage_key to match the layout",
    )?;

    let other = ctx.next(node("other", NodeKind::Requirement));
    ensure(other.load::<u64>(&alice, "count")?.is_none(), "Expected counters to be scoped per node")?;
    Ok(())
}

/// Tests that a root view without a current node neither reads nor writes.
#[test]
fn test_root_view_store_is_noop() -> TestResult {
    let storage = Arc::new(MemoryStorage::new());
    let scope = Scope::new(Arc::clone(&storage) as Arc<dyn Storage>);
    let alice = player("alice", 5);
    let root = ExecutionContext::of(scope, None, [alice.clone()]);

    ensure(root.store(&alice, "count", &1_u64)?.is_none(), "Expected no previous value")?;
    ensure(storage.is_empty()?, "Expected nothing to be written")?;
    ensure(root.load::<u64>(&alice, "count")?.is_none(), "Expected nothing to be read")?;
    Ok(())
}

/// Tests that a value of an unexpected shape reads as absent.
#[test]
fn test_load_with_wrong_shape_is_absent() -> TestResult {
    let scope = Scope::in_memory();
    let alice = player("alice", 5);
    let id = NodeId::new("gate");
    scope.store(&id, &alice, "last_execution", &"yesterday")?;
    ensure(scope.load::<i64>(&id, &alice, "last_execution")?.is_none(), "Expected a mismatched shape to be absent")?;
    Ok(())
}

/// Tests memory storage set and get semantics.
#[test]
fn test_memory_storage_returns_previous() -> TestResult {
    let storage = MemoryStorage::new();
    ensure(storage.set("k", json!(1))?.is_none(), "Expected no previous value")?;
    ensure(storage.set("k", json!(2))? == Some(json!(1)), "Expected the previous value")?;
    ensure(storage.get("k")? == Some(json!(2)), "Expected the latest value")?;
    ensure(storage.len()? == 1, "Expected one key")?;

    let shared = storage.clone();
    let _ = shared.set("other", json!(true))?;
    ensure(storage.len()? == 2, "Expected clones to share the map")?;
    Ok(())
}
