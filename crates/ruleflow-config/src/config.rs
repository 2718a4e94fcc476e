// crates/ruleflow-config/src/config.rs
// ============================================================================
// Module: Ruleflow Configuration
// Description: Configuration loading and validation for the rule engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: ruleflow-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file. The path comes from the caller,
//! then the `RULEFLOW_CONFIG` environment variable, then `ruleflow.toml` in
//! the working directory. Missing, oversized or invalid configuration fails
//! closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ruleflow_core::ActionConfig;
use ruleflow_core::FlowParser;
use ruleflow_core::NodeFactory;
use ruleflow_core::RequirementConfig;
use ruleflow_core::TriggerConfig;
use ruleflow_core::flow::parser::DEFAULT_MAX_LINES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "ruleflow.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "RULEFLOW_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `flow.max_lines`.
pub const MAX_FLOW_LINES: usize = 1_000_000;
/// Maximum length of the logging filter directive.
const MAX_FILTER_LENGTH: usize = 1024;
/// Default logging filter directive.
const DEFAULT_LOG_FILTER: &str = "ruleflow=info,warn";

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleflowConfig {
    /// Flow parsing limits.
    pub flow: FlowConfig,
    /// Default node policies for node factories.
    pub defaults: NodeDefaults,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Flow parsing limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Maximum lines accepted in one flow script.
    pub max_lines: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Default node policies applied by node factories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeDefaults {
    /// Default action policy.
    pub action: ActionConfig,
    /// Default requirement policy.
    pub requirement: RequirementConfig,
    /// Default trigger policy.
    pub trigger: TriggerConfig,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Full output with span context.
    Full,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Line format.
    pub format: LogFormat,
    /// Include the event target in each line.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::Compact,
            with_target: false,
        }
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl RuleflowConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml_str(content)?;
        tracing::info!(path = %resolved.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.flow.validate()?;
        self.defaults.validate()?;
        self.logging.validate()
    }

    /// Builds a flow parser over `factory` honoring `flow.max_lines`.
    #[must_use]
    pub fn flow_parser<'a, F: NodeFactory + ?Sized>(&self, factory: &'a F) -> FlowParser<'a, F> {
        FlowParser::new(factory).with_max_lines(self.flow.max_lines)
    }
}

impl FlowConfig {
    /// Validates flow limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lines == 0 {
            return Err(ConfigError::Invalid("flow.max_lines must be greater than zero".to_string()));
        }
        if self.max_lines > MAX_FLOW_LINES {
            return Err(ConfigError::Invalid(format!("flow.max_lines must be at most {MAX_FLOW_LINES}")));
        }
        Ok(())
    }
}

impl NodeDefaults {
    /// Rejects identifiers in defaults; each node needs its own.
    fn validate(&self) -> Result<(), ConfigError> {
        let shared = [
            ("defaults.action", self.action.identifier.is_some()),
            ("defaults.requirement", self.requirement.identifier.is_some()),
            ("defaults.trigger", self.trigger.identifier.is_some()),
        ];
        for (section, has_identifier) in shared {
            if has_identifier {
                return Err(ConfigError::Invalid(format!("{section}.identifier must not be set")));
            }
        }
        Ok(())
    }
}

impl LoggingConfig {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let filter = self.filter.trim();
        if filter.is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        if filter.len() > MAX_FILTER_LENGTH {
            return Err(ConfigError::Invalid("logging.filter exceeds max length".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let resolved = match path {
        Some(path) => path.to_path_buf(),
        None => env::var(CONFIG_ENV_VAR).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
    };
    if resolved.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    Ok(resolved)
}
