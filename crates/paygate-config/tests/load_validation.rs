//! Config load validation tests for paygate-config.
// crates/paygate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use paygate_config::ConfigError;
use paygate_config::PaygateConfig;
use paygate_config::config_toml_example;
use tempfile::NamedTempFile;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PaygateConfig, ConfigError>, needle: &str) -> TestResult {
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
    assert_invalid(PaygateConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(PaygateConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(PaygateConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(PaygateConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_reports_missing_file_as_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(PaygateConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_reports_malformed_toml_as_parse_error() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[gateway\nbase_url = 1").map_err(|err| err.to_string())?;
    assert_invalid(PaygateConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_requires_gateway_section() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[retry]\nmax_attempts = 2\n").map_err(|err| err.to_string())?;
    assert_invalid(PaygateConfig::load(Some(file.path())), "gateway")?;
    Ok(())
}

#[test]
fn load_accepts_minimal_file_with_defaults() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(common::MINIMAL_TOML.as_bytes()).map_err(|err| err.to_string())?;
    let config = PaygateConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.retry.max_attempts != 3 {
        return Err(format!("unexpected default attempts {}", config.retry.max_attempts));
    }
    if config.cache.sqlite_config().is_some() {
        return Err("memory cache should not produce sqlite config".to_string());
    }
    if config.gateway.auth_scheme != "PortOne" {
        return Err(format!("unexpected auth scheme {}", config.gateway.auth_scheme));
    }
    Ok(())
}

#[test]
fn example_config_parses_and_validates() -> TestResult {
    let config =
        PaygateConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    let sqlite = config.cache.sqlite_config().ok_or("example should use sqlite cache")?;
    if sqlite.path != Path::new("paygate-mappings.db") {
        return Err(format!("unexpected cache path {}", sqlite.path.display()));
    }
    if config.gateway.api_secret_env.as_deref() != Some("PAYGATE_API_SECRET") {
        return Err("example should read the secret from the environment".to_string());
    }
    Ok(())
}
