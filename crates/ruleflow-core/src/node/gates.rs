// crates/ruleflow-core/src/node/gates.rs
// ============================================================================
// Module: Node Gates
// Description: Counter names and execute-once / cooldown gate checks.
// Purpose: Share gate logic between action and trigger nodes.
// Dependencies: crate::result, crate::time
// ============================================================================

//! ## Overview
//! Gates are preconditions evaluated before a node body runs. They read the
//! per-(node, target) `last_execution` counter, which is absent (or zero)
//! until the node first executes for that target.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::context::NodeKind;
use crate::result::EvalResult;
use crate::time::format_short;

// ============================================================================
// SECTION: Counter Names
// ============================================================================

/// Epoch milliseconds of the last execution for a target.
pub const LAST_EXECUTION: &str = "last_execution";
/// Number of successful checks for a target.
pub const COUNT: &str = "count";
/// Cached outcome of a check-once requirement for a target.
pub const CHECK_ONCE_RESULT: &str = "check_once_result";

// ============================================================================
// SECTION: Gates
// ============================================================================

/// Returns true when a last-execution stamp records a prior execution.
const fn has_executed(last_execution: Option<i64>) -> bool {
    matches!(last_execution, Some(stamp) if stamp > 0)
}

/// Execute-once gate: EMPTY when disabled, FAILURE after a prior execution.
pub(crate) fn execute_once(kind: NodeKind, enabled: bool, last_execution: Option<i64>) -> EvalResult {
    if !enabled {
        return EvalResult::empty();
    }
    if has_executed(last_execution) {
        return EvalResult::failure().with_message(format!("{kind} can only be executed once and was already executed"));
    }
    EvalResult::success()
}

/// Cooldown gate: EMPTY when disabled, FAILURE while the cooldown is running.
pub(crate) fn cooldown(kind: NodeKind, cooldown: Duration, last_execution: Option<i64>, now_millis: i64) -> EvalResult {
    if cooldown.is_zero() {
        return EvalResult::empty();
    }
    let Some(last) = last_execution.filter(|stamp| *stamp > 0) else {
        return EvalResult::success();
    };
    let cooldown_millis = i64::try_from(cooldown.as_millis()).unwrap_or(i64::MAX);
    let remaining = last.saturating_add(cooldown_millis).saturating_sub(now_millis);
    if remaining > 0 {
        let remaining = Duration::from_millis(remaining.unsigned_abs());
        return EvalResult::failure()
            .with_message(format!("{kind} is still on cooldown: {} remaining", format_short(remaining)));
    }
    EvalResult::success()
}
