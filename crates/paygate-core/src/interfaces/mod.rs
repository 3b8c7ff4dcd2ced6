// crates/paygate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Paygate Interfaces
// Description: Backend-agnostic gateway and identifier-mapping interfaces.
// Purpose: Define the seams the reconciliation engine is injected through.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces keep the engine independent of HTTP clients and storage
//! backends so it can be driven by a fake gateway in tests. Probe
//! implementations must report an unrecognized id as a negative
//! [`ProbeResult`], reserving [`GatewayError`] for failures that should abort
//! a candidate search.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CancelRequest;
use crate::core::GatewayPaymentRecord;
use crate::core::GatewayRejection;
use crate::core::IdempotencyKey;
use crate::core::OrderReference;
use crate::core::PaymentId;

// ============================================================================
// SECTION: Gateway Probe
// ============================================================================

/// Result of a read-only gateway lookup.
///
/// # Invariants
/// - `record` is `Some` exactly when `valid` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Whether the gateway recognized the identifier.
    pub valid: bool,
    /// Gateway record when recognized.
    pub record: Option<GatewayPaymentRecord>,
}

impl ProbeResult {
    /// Positive lookup result.
    #[must_use]
    pub const fn found(record: GatewayPaymentRecord) -> Self {
        Self {
            valid: true,
            record: Some(record),
        }
    }

    /// Negative lookup result (unknown id).
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            valid: false,
            record: None,
        }
    }
}

/// Gateway failures distinct from "identifier not recognized".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport failure, timeout, or 5xx response.
    #[error("gateway unreachable: {detail}")]
    Unreachable {
        /// Failure summary.
        detail: String,
        /// Response body when the gateway answered with 5xx.
        body: Option<String>,
    },
    /// Structured rejection of a well-formed request.
    #[error("gateway rejected request: {0}")]
    Rejected(GatewayRejection),
    /// Request refused locally before anything was sent.
    #[error("gateway request not sent: {0}")]
    InvalidRequest(String),
    /// Response that could not be interpreted.
    #[error("gateway returned an invalid response: {detail}")]
    InvalidResponse {
        /// Failure summary.
        detail: String,
        /// Raw response body.
        body: String,
    },
}

impl GatewayError {
    /// Shorthand for a transport failure without a response body.
    #[must_use]
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self::Unreachable {
            detail: detail.into(),
            body: None,
        }
    }

    /// Returns true when the failure is worth retrying for idempotent reads.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Read-only gateway lookups.
pub trait GatewayProbe {
    /// Looks up a payment by candidate identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the gateway is unreachable or answers
    /// with something other than a record or a 4xx.
    fn probe(&self, candidate: &str) -> Result<ProbeResult, GatewayError>;

    /// Looks up a payment by the caller's order reference.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] under the same conditions as [`Self::probe`].
    fn probe_order(&self, order: &OrderReference) -> Result<ProbeResult, GatewayError>;
}

/// Gateway operations including mutating calls.
pub trait PaymentGateway: GatewayProbe {
    /// Cancels a confirmed payment. Implementations must not retry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport failure or gateway rejection,
    /// carrying the raw response body when one was received.
    fn cancel(
        &self,
        payment_id: &PaymentId,
        request: &CancelRequest,
        idempotency_key: &IdempotencyKey,
    ) -> Result<GatewayPaymentRecord, GatewayError>;
}

// ============================================================================
// SECTION: Mapping Store
// ============================================================================

/// Identifier-mapping store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// I/O failure.
    #[error("mapping store io error: {0}")]
    Io(String),
    /// Stored data failed validation.
    #[error("mapping store corruption: {0}")]
    Corrupt(String),
    /// Invalid input.
    #[error("mapping store invalid data: {0}")]
    Invalid(String),
    /// Backend failure.
    #[error("mapping store error: {0}")]
    Store(String),
}

/// Persistent raw identifier to confirmed payment id mapping.
///
/// # Invariants
/// - `upsert` is idempotent; concurrent writers for the same key write the
///   same value, so last writer wins.
pub trait MappingStore {
    /// Returns the confirmed payment id for a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn lookup(&self, raw: &str) -> Result<Option<PaymentId>, StoreError>;

    /// Records a confirmed mapping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn upsert(&self, raw: &str, payment_id: &PaymentId) -> Result<(), StoreError>;
}

impl<S: MappingStore + ?Sized> MappingStore for Box<S> {
    fn lookup(&self, raw: &str) -> Result<Option<PaymentId>, StoreError> {
        (**self).lookup(raw)
    }

    fn upsert(&self, raw: &str, payment_id: &PaymentId) -> Result<(), StoreError> {
        (**self).upsert(raw, payment_id)
    }
}
