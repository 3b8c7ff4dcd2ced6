// crates/paygate-config/src/config.rs
// ============================================================================
// Module: Paygate Configuration
// Description: Configuration loading and validation for paygate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: paygate-core, paygate-http, paygate-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path comes from the caller, then `PAYGATE_CONFIG`, then
//! `paygate.toml` in the working directory. Missing or invalid configuration
//! fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use paygate_core::DEFAULT_CANCEL_REASON;
use paygate_core::EngineConfig;
use paygate_core::FileAuditSink;
use paygate_core::NoopAuditSink;
use paygate_core::ReconcileAuditSink;
use paygate_core::RetryPolicy;
use paygate_core::StderrAuditSink;
use paygate_http::DEFAULT_AUTH_SCHEME;
use paygate_http::DEFAULT_MAX_RESPONSE_BYTES;
use paygate_http::DEFAULT_TIMEOUT_MS;
use paygate_http::HttpGatewayConfig;
use paygate_store_sqlite::SqliteMappingStoreConfig;
use paygate_store_sqlite::SqliteStoreMode;
use paygate_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "paygate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PAYGATE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 120_000;
/// Hard upper bound for `max_response_bytes`.
const MAX_RESPONSE_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Maximum read attempts allowed by configuration.
const MAX_RETRY_ATTEMPTS: u32 = 10;
/// Maximum backoff allowed by configuration, in milliseconds.
const MAX_BACKOFF_MS: u64 = 60_000;
/// Maximum cancel reason length in characters.
const MAX_REASON_LENGTH: usize = 200;
/// Default `SQLite` busy timeout in milliseconds.
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Paygate configuration root.
#[derive(Debug, Clone, Deserialize)]
pub struct PaygateConfig {
    /// Gateway connection settings.
    pub gateway: GatewayConfig,
    /// Read retry settings.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Cancel defaults.
    #[serde(default)]
    pub cancel: CancelConfig,
    /// Identifier-mapping cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Audit log settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl PaygateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway.validate()?;
        self.retry.validate()?;
        self.cancel.validate()?;
        self.cache.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Builds the HTTP gateway configuration, resolving the API secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the secret cannot be resolved.
    pub fn http_gateway_config(&self) -> Result<HttpGatewayConfig, ConfigError> {
        let gateway = &self.gateway;
        let mut config = HttpGatewayConfig::new(gateway.base_url.trim(), gateway.resolve_secret()?);
        config.auth_scheme.clone_from(&gateway.auth_scheme);
        config.timeout_ms = gateway.timeout_ms;
        config.allow_http = gateway.allow_http;
        config.max_response_bytes = gateway.max_response_bytes;
        if let Some(user_agent) = &gateway.user_agent {
            config.user_agent.clone_from(user_agent);
        }
        Ok(config)
    }

    /// Returns the read retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
        }
    }

    /// Returns the reconciliation engine configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            retry: self.retry_policy(),
            default_cancel_reason: self.cancel.default_reason.trim().to_string(),
        }
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Gateway connection settings.
///
/// # Invariants
/// - Exactly one of `api_secret` and `api_secret_env` is set.
/// - `Debug` never prints the inline secret.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway API base URL.
    pub base_url: String,
    /// Inline API secret (discouraged).
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Environment variable holding the API secret.
    #[serde(default)]
    pub api_secret_env: Option<String>,
    /// Authorization scheme preceding the secret.
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Optional user agent override.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Allow cleartext HTTP base URLs.
    #[serde(default)]
    pub allow_http: bool,
    /// Maximum response size allowed, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("api_secret_env", &self.api_secret_env)
            .field("auth_scheme", &self.auth_scheme)
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .field("allow_http", &self.allow_http)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

impl GatewayConfig {
    /// Validates gateway settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|_| ConfigError::Invalid("gateway.base_url is not a valid url".to_string()))?;
        match url.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(ConfigError::Invalid(
                    "gateway.base_url uses http; set gateway.allow_http = true".to_string(),
                ));
            }
            _ => {
                return Err(ConfigError::Invalid(
                    "gateway.base_url must use https".to_string(),
                ));
            }
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid("gateway.base_url requires a host".to_string()));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ConfigError::Invalid(
                "gateway.base_url must not embed credentials".to_string(),
            ));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "gateway.base_url must not carry a query or fragment".to_string(),
            ));
        }
        match (&self.api_secret, &self.api_secret_env) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid(
                    "set only one of gateway.api_secret and gateway.api_secret_env".to_string(),
                ));
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "gateway.api_secret_env or gateway.api_secret is required".to_string(),
                ));
            }
            (Some(secret), None) if secret.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "gateway.api_secret must be non-empty".to_string(),
                ));
            }
            (None, Some(name)) if name.trim().is_empty() => {
                return Err(ConfigError::Invalid(
                    "gateway.api_secret_env must be non-empty".to_string(),
                ));
            }
            _ => {}
        }
        if self.auth_scheme.trim().is_empty() || self.auth_scheme.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "gateway.auth_scheme must be a single token".to_string(),
            ));
        }
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "gateway.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "gateway.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        if let Some(user_agent) = &self.user_agent
            && user_agent.trim().is_empty()
        {
            return Err(ConfigError::Invalid("gateway.user_agent must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Returns the API secret from inline config or the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the environment variable is
    /// unset or empty.
    pub fn resolve_secret(&self) -> Result<String, ConfigError> {
        if let Some(secret) = &self.api_secret {
            return Ok(secret.trim().to_string());
        }
        let name = self.api_secret_env.as_deref().map(str::trim).unwrap_or_default();
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(ConfigError::Invalid(format!("environment variable {name} is not set"))),
        }
    }
}

/// Returns the default authorization scheme.
fn default_auth_scheme() -> String {
    DEFAULT_AUTH_SCHEME.to_string()
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default response size limit.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Retry and Cancel
// ============================================================================

/// Read retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// Upper bound on a single delay, in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryConfig {
    /// Validates retry bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 || self.max_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "retry.max_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}"
            )));
        }
        if self.max_backoff_ms > MAX_BACKOFF_MS {
            return Err(ConfigError::Invalid(format!(
                "retry.max_backoff_ms must not exceed {MAX_BACKOFF_MS}"
            )));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Returns the default attempt count.
const fn default_max_attempts() -> u32 {
    3
}

/// Returns the default initial backoff.
const fn default_initial_backoff_ms() -> u64 {
    200
}

/// Returns the default maximum backoff.
const fn default_max_backoff_ms() -> u64 {
    2_000
}

/// Cancel defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelConfig {
    /// Reason sent when the caller supplies none.
    #[serde(default = "default_cancel_reason")]
    pub default_reason: String,
}

impl Default for CancelConfig {
    fn default() -> Self {
        Self {
            default_reason: default_cancel_reason(),
        }
    }
}

impl CancelConfig {
    /// Validates the default reason.
    fn validate(&self) -> Result<(), ConfigError> {
        let reason = self.default_reason.trim();
        if reason.is_empty() {
            return Err(ConfigError::Invalid("cancel.default_reason must be non-empty".to_string()));
        }
        if reason.chars().count() > MAX_REASON_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "cancel.default_reason exceeds {MAX_REASON_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// Returns the default cancel reason.
fn default_cancel_reason() -> String {
    DEFAULT_CANCEL_REASON.to_string()
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Mapping cache backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// In-process cache; mappings are lost on exit.
    #[default]
    Memory,
    /// Durable `SQLite` cache.
    Sqlite,
}

/// Identifier-mapping cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Cache backend type.
    #[serde(rename = "type", default)]
    pub cache_type: CacheType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl CacheConfig {
    /// Validates cache configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.cache_type {
            CacheType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory cache must not set path".to_string()));
                }
                Ok(())
            }
            CacheType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite cache requires path".to_string())
                })?;
                validate_path_string("cache.path", &path.to_string_lossy())
            }
        }
    }

    /// Returns the `SQLite` store configuration for the sqlite backend.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteMappingStoreConfig> {
        match (self.cache_type, &self.path) {
            (CacheType::Sqlite, Some(path)) => Some(SqliteMappingStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
            }),
            _ => None,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit log settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn ReconcileAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(path).map_err(|err| {
                    ConfigError::Io(format!("failed to open audit log {}: {err}", path.display()))
                })?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires audit.path".to_string()))
            }
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
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

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
