// crates/ruleflow-config/src/logging.rs
// ============================================================================
// Module: Logging Bootstrap
// Description: Installs the process-wide tracing subscriber.
// Purpose: Apply the configured log filter and format once at startup.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! [`init_tracing`] installs a `tracing-subscriber` fmt subscriber. The
//! `RUST_LOG` environment variable, when set and valid, overrides the
//! configured filter.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;
use crate::config::LogFormat;
use crate::config::LoggingConfig;

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Builds the effective filter: `RUST_LOG` first, then the configured one.
///
/// # Errors
///
/// Returns [`ConfigError`] when the configured filter does not parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|err| ConfigError::Invalid(format!("logging.filter: {err}")))
}

/// Installs the global tracing subscriber described by `config`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the filter is invalid or a global subscriber
/// is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(config.with_target);
    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Full => builder.try_init(),
    };
    installed.map_err(|err| ConfigError::Invalid(format!("tracing subscriber: {err}")))?;
    tracing::debug!(filter = %config.filter, "tracing initialized");
    Ok(())
}
