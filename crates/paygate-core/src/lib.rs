// crates/paygate-core/src/lib.rs
// ============================================================================
// Module: Paygate Core
// Description: Payment identifier normalization and gateway reconciliation.
// Purpose: Map locally stored payment identifiers to gateway payment ids.
// Dependencies: rand, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Paygate core turns inconsistently formatted local payment identifiers into
//! the one identifier the payment gateway recognizes, then checks, cancels,
//! or reconciles that payment. Transport and storage live behind the
//! [`GatewayProbe`], [`PaymentGateway`], and [`MappingStore`] interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditEventParams;
pub use audit::AuditOutcome;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::ReconcileAuditEvent;
pub use audit::ReconcileAuditSink;
pub use audit::StderrAuditSink;
pub use crate::core::*;
pub use interfaces::GatewayError;
pub use interfaces::GatewayProbe;
pub use interfaces::MappingStore;
pub use interfaces::PaymentGateway;
pub use interfaces::ProbeResult;
pub use interfaces::StoreError;
pub use crate::runtime::*;
