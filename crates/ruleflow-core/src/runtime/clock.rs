// crates/ruleflow-core/src/runtime/clock.rs
// ============================================================================
// Module: System Clock
// Description: Wall-clock implementation of the clock interface.
// Purpose: Supply "now" to cooldown bookkeeping in production hosts.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The node runtime never reads wall-clock time directly; [`SystemClock`] is
//! the default [`Clock`] a [`Scope`](crate::Scope) is built with.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use crate::interfaces::Clock;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
    }
}
