// crates/paygate-cli/src/lib.rs
// ============================================================================
// Module: Paygate CLI Library
// Description: Shared helpers for the paygate command-line interface.
// Purpose: Provide reusable components (message catalog) for the binary and tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This library houses the message catalog used by the `paygate` binary. The
//! entry point (`src/main.rs`) routes every user-facing string through
//! [`t!`] so operator output stays consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and formatting helpers.
pub mod i18n;

#[cfg(test)]
mod tests;
