// crates/paygate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `paygate config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for `paygate.toml`. The output is deterministic and is
//! validated by the crate's tests.

/// Returns a canonical example `paygate.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[gateway]
base_url = "https://api.portone.io"
api_secret_env = "PAYGATE_API_SECRET"
# api_secret = "inline secrets are discouraged"
auth_scheme = "PortOne"
timeout_ms = 10000
allow_http = false
max_response_bytes = 1048576

[retry]
max_attempts = 3
initial_backoff_ms = 200
max_backoff_ms = 2000

[cancel]
default_reason = "Cancelled by merchant request"

[cache]
type = "sqlite"
path = "paygate-mappings.db"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[audit]
sink = "file"
path = "paygate-audit.log"
"#,
    )
}
