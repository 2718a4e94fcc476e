// crates/ruleflow-core/src/node/config.rs
// ============================================================================
// Module: Node Policy Configs
// Description: Runtime policy settings for action, requirement and trigger nodes.
// Purpose: Describe delay, cooldown, execute-once, counting and negation policy.
// Dependencies: serde, crate::time
// ============================================================================

//! ## Overview
//! Policy configs are plain serde structs so that node factories can read
//! them from any declarative source. Unknown fields are rejected. Durations
//! use the notation in [`crate::time`] or integer milliseconds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Action Config
// ============================================================================

/// Policy of an action node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionConfig {
    /// Stable node identifier; a random one is generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Delay before the body runs, when a scheduler is available.
    #[serde(with = "crate::time::notation")]
    pub delay: Duration,
    /// Minimum time between executions for the same target.
    #[serde(with = "crate::time::notation")]
    pub cooldown: Duration,
    /// Execute at most once per target.
    pub execute_once: bool,
}

// ============================================================================
// SECTION: Requirement Config
// ============================================================================

/// Policy of a requirement node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequirementConfig {
    /// Stable node identifier; a random one is generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Successful checks required before the requirement passes; 0 disables.
    pub count: u64,
    /// Swap success and failure.
    #[serde(alias = "negated")]
    pub negate: bool,
    /// Cache the first outcome per target and reuse it.
    pub check_once: bool,
}

// ============================================================================
// SECTION: Trigger Config
// ============================================================================

/// Policy of a trigger node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerConfig {
    /// Stable node identifier; a random one is generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Delay before the batch is processed, when a scheduler is available.
    #[serde(with = "crate::time::notation")]
    pub delay: Duration,
    /// Minimum time between firings for the same target.
    #[serde(with = "crate::time::notation")]
    pub cooldown: Duration,
    /// Fire at most once per target.
    pub execute_once: bool,
    /// Execute attached actions for every fired target.
    pub execute_actions: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            identifier: None,
            delay: Duration::ZERO,
            cooldown: Duration::ZERO,
            execute_once: false,
            execute_actions: true,
        }
    }
}
