// crates/paygate-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Unit tests for catalog lookup and placeholder substitution.
// Purpose: Ensure operator messages render deterministically.
// Dependencies: paygate-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog keys are unique, placeholders substitute, and unknown keys
//! fall back to the key itself.

use std::collections::BTreeSet;

use crate::i18n::CATALOG_ITEMS;
use crate::i18n::MessageArg;
use crate::i18n::translate;

#[test]
fn catalog_keys_are_unique() {
    let keys: BTreeSet<&str> = CATALOG_ITEMS.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys.len(), CATALOG_ITEMS.len());
}

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "gateway.response_body",
        vec![MessageArg::new("body", r#"{"type":"ALREADY_CANCELLED"}"#)],
    );
    assert!(output.contains("ALREADY_CANCELLED"));
    assert!(!output.contains("{body}"));
}

#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("no.such.key", Vec::new()), "no.such.key");
}

#[test]
fn macro_formats_named_arguments() {
    let output = crate::t!("config.load_failed", error = "boom");
    assert_eq!(output, "Failed to load config: boom");
}
