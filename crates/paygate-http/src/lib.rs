// crates/paygate-http/src/lib.rs
// ============================================================================
// Module: Paygate HTTP Gateway
// Description: Blocking HTTP adapter for the payment gateway REST API.
// Purpose: Implement the gateway interfaces over reqwest with strict limits.
// Dependencies: paygate-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! This crate provides [`HttpGateway`], the production implementation of
//! [`paygate_core::GatewayProbe`] and [`paygate_core::PaymentGateway`]. Reads
//! map 4xx answers to "not found" so candidate probing can continue; cancels
//! surface every gateway answer with its raw body.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gateway;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gateway::DEFAULT_AUTH_SCHEME;
pub use gateway::DEFAULT_MAX_RESPONSE_BYTES;
pub use gateway::DEFAULT_TIMEOUT_MS;
pub use gateway::HttpGateway;
pub use gateway::HttpGatewayConfig;
pub use gateway::HttpGatewayError;
pub use gateway::IDEMPOTENCY_KEY_HEADER;
