// crates/paygate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for paygate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use paygate_config::PaygateConfig;

/// Minimal valid configuration using an inline secret.
pub const MINIMAL_TOML: &str = r#"
[gateway]
base_url = "https://api.portone.io"
api_secret = "test_secret"
"#;

/// Parses a TOML string into a `PaygateConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<PaygateConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<PaygateConfig, String> {
    config_from_toml(MINIMAL_TOML).map_err(|err| err.to_string())
}
