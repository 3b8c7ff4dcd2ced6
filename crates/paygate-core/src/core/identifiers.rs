// crates/paygate-core/src/core/identifiers.rs
// ============================================================================
// Module: Paygate Identifiers
// Description: Typed identifiers for gateway payments, orders, and cancels.
// Purpose: Keep syntactic payment ids, confirmed ids, and order refs distinct.
// Dependencies: rand, serde
// ============================================================================

//! ## Overview
//! This module defines the identifier types that flow through reconciliation.
//! [`NormalizedPaymentId`] enforces the gateway's syntactic format and can only
//! be built through validation. [`PaymentId`] is an id the gateway has
//! confirmed, whatever its shape. [`OrderReference`] is the caller's local
//! order key, and [`IdempotencyKey`] is drawn fresh for every cancel call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Literal prefix every gateway payment id starts with.
pub const PAYMENT_ID_PREFIX: &str = "pay_";
/// Number of alphanumeric characters after the prefix.
pub const PAYMENT_ID_BODY_LEN: usize = 22;
/// Total length of a normalized payment id.
pub const PAYMENT_ID_LEN: usize = PAYMENT_ID_PREFIX.len() + PAYMENT_ID_BODY_LEN;
/// Filler used when right-padding a short identifier body.
pub const PAYMENT_ID_FILLER: char = '0';
/// Prefix applied to generated idempotency keys.
const IDEMPOTENCY_KEY_PREFIX: &str = "cancel-";

// ============================================================================
// SECTION: Normalized Payment Id
// ============================================================================

/// Gateway payment id in its mandated syntactic form.
///
/// # Invariants
/// - Exactly [`PAYMENT_ID_LEN`] characters.
/// - Starts with [`PAYMENT_ID_PREFIX`], followed by ASCII alphanumerics only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NormalizedPaymentId(String);

impl NormalizedPaymentId {
    /// Parses a conformant payment id, returning `None` for anything else.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        is_normalized(value).then(|| Self(value.to_string()))
    }

    /// Builds a payment id from an already-fitted body.
    ///
    /// Callers must pass exactly [`PAYMENT_ID_BODY_LEN`] ASCII alphanumerics.
    pub(crate) fn from_fitted_body(body: &str) -> Self {
        debug_assert!(body.len() == PAYMENT_ID_BODY_LEN, "fitted body must be 22 chars");
        Self(format!("{PAYMENT_ID_PREFIX}{body}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the 22-character body after the prefix.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.0[PAYMENT_ID_PREFIX.len()..]
    }
}

impl fmt::Display for NormalizedPaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for NormalizedPaymentId {
    type Error = InvalidPaymentId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_normalized(&value) { Ok(Self(value)) } else { Err(InvalidPaymentId(value)) }
    }
}

impl From<NormalizedPaymentId> for String {
    fn from(value: NormalizedPaymentId) -> Self {
        value.0
    }
}

/// Error returned when a string does not match the payment id format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a normalized payment id: {0}")]
pub struct InvalidPaymentId(pub String);

/// Returns true when `value` is `pay_` followed by exactly 22 ASCII alphanumerics.
#[must_use]
pub fn is_normalized(value: &str) -> bool {
    value.len() == PAYMENT_ID_LEN
        && value.starts_with(PAYMENT_ID_PREFIX)
        && value[PAYMENT_ID_PREFIX.len()..].bytes().all(|byte| byte.is_ascii_alphanumeric())
}

// ============================================================================
// SECTION: Confirmed Payment Id
// ============================================================================

/// Payment id the gateway has recognized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Creates a confirmed payment identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the normalized form when the confirmed id is conformant.
    #[must_use]
    pub fn as_normalized(&self) -> Option<NormalizedPaymentId> {
        NormalizedPaymentId::parse(&self.0)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PaymentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PaymentId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<NormalizedPaymentId> for PaymentId {
    fn from(value: NormalizedPaymentId) -> Self {
        Self(value.0)
    }
}

// ============================================================================
// SECTION: Order Reference
// ============================================================================

/// Caller-side order reference used for the order-indexed gateway lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Creates a new order reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OrderReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OrderReference {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Idempotency Key
// ============================================================================

/// Per-attempt idempotency key sent with mutating gateway requests.
///
/// # Invariants
/// - [`IdempotencyKey::generate`] draws a new random value on every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Draws a fresh key: `cancel-` followed by 32 lowercase hex characters.
    #[must_use]
    pub fn generate() -> Self {
        let value: u128 = rand::random();
        Self(format!("{IDEMPOTENCY_KEY_PREFIX}{value:032x}"))
    }

    /// Wraps an externally supplied key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
