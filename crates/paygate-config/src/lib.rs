// crates/paygate-config/src/lib.rs
// ============================================================================
// Module: Paygate Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for paygate.toml semantics.
// Dependencies: paygate-core, paygate-http, paygate-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `paygate-config` defines the configuration model for the reconciliation
//! tooling. Validation is strict and fail-closed; the gateway secret is read
//! from the environment by default and never echoed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
