//! Config load validation tests for ruleflow-config.
// crates/ruleflow-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use ruleflow_config::ConfigError;
use ruleflow_config::RuleflowConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<RuleflowConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(RuleflowConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(RuleflowConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(RuleflowConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(RuleflowConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_reads_valid_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let content = r#"
[flow]
max_lines = 250

[defaults.action]
cooldown = "1m30s"
execute_once = true

[defaults.trigger]
delay = 500
execute_actions = false

[logging]
filter = "ruleflow=debug"
format = "full"
"#;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    let config = RuleflowConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.flow.max_lines != 250 {
        return Err(format!("unexpected max_lines {}", config.flow.max_lines));
    }
    if config.defaults.action.cooldown != Duration::from_secs(90) || !config.defaults.action.execute_once {
        return Err(format!("unexpected action defaults {:?}", config.defaults.action));
    }
    if config.defaults.trigger.delay != Duration::from_millis(500) || config.defaults.trigger.execute_actions {
        return Err(format!("unexpected trigger defaults {:?}", config.defaults.trigger));
    }
    if config.logging.filter != "ruleflow=debug" {
        return Err(format!("unexpected filter {}", config.logging.filter));
    }
    Ok(())
}

#[test]
fn load_rejects_invalid_duration() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[defaults.action]\ndelay = \"5s3m\"\n").map_err(|err| err.to_string())?;
    assert_invalid(RuleflowConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}
