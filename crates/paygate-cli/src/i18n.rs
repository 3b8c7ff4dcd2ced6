// crates/paygate-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and formatting utilities for the CLI.
// Purpose: Centralize user-facing strings so operator output stays consistent.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The `paygate` CLI stores user-facing strings in a small catalog keyed by
//! stable identifiers. All runtime output should be routed through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"raw"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
pub(crate) const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "paygate {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.serialize_failed", "Failed to serialize output: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("gateway.init_failed", "Failed to initialize gateway client: {error}"),
    ("gateway.response_body", "Gateway response body: {body}"),
    ("cache.open_failed", "Failed to open mapping cache: {error}"),
    (
        "cache.sqlite_required",
        "Mapping commands need a durable cache; set [cache] type = \"sqlite\" with a path.",
    ),
    ("mapping.list_failed", "Failed to list mappings: {error}"),
    ("mapping.forget_failed", "Failed to remove mapping for {raw}: {error}"),
    ("input.status_invalid", "Unknown payment status: {value}"),
    ("operation.failed", "{operation} failed ({kind}): {error}"),
    ("operation.resolve", "Resolve"),
    ("operation.status", "Status lookup"),
    ("operation.cancel", "Cancel"),
    ("operation.reconcile", "Reconcile"),
    ("cancel.already_cancelled", "The gateway reports this payment as already cancelled."),
    ("reconcile.drift", "Local order differs from the gateway in {count} field(s)."),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
