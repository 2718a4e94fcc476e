// crates/ruleflow-config/src/lib.rs
// ============================================================================
// Module: Ruleflow Config Library
// Description: Engine configuration model, validation and logging bootstrap.
// Purpose: Single source of truth for ruleflow.toml semantics.
// Dependencies: ruleflow-core, serde, toml, tracing-subscriber
// ============================================================================

//! ## Overview
//! `ruleflow-config` defines the engine configuration loaded from
//! `ruleflow.toml`: flow parsing limits, default node policies handed to
//! node factories, and logging. Loading is strict and fails closed on
//! oversized files, unknown keys and out-of-range values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod logging;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use logging::init_tracing;
