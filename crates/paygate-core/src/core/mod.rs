// crates/paygate-core/src/core/mod.rs
// ============================================================================
// Module: Paygate Core Types
// Description: Identifiers, normalization, candidate generation, and records.
// Purpose: Group the pure, network-free building blocks of reconciliation.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! Core types are pure and deterministic: nothing in this module performs
//! I/O. The runtime composes them with gateway and store interfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod candidates;
pub mod identifiers;
pub mod normalize;
pub mod records;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use candidates::Candidate;
pub use candidates::CandidateGenerator;
pub use candidates::CandidateKind;
pub use candidates::CandidateSet;
pub use candidates::ClockFn;
pub use identifiers::IdempotencyKey;
pub use identifiers::InvalidPaymentId;
pub use identifiers::NormalizedPaymentId;
pub use identifiers::OrderReference;
pub use identifiers::PAYMENT_ID_BODY_LEN;
pub use identifiers::PAYMENT_ID_FILLER;
pub use identifiers::PAYMENT_ID_LEN;
pub use identifiers::PAYMENT_ID_PREFIX;
pub use identifiers::PaymentId;
pub use identifiers::is_normalized;
pub use normalize::normalize;
pub use records::CancelRequest;
pub use records::CancelResult;
pub use records::GatewayPaymentRecord;
pub use records::GatewayRejection;
pub use records::PaymentStatus;
