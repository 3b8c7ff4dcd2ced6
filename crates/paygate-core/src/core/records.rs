// crates/paygate-core/src/core/records.rs
// ============================================================================
// Module: Gateway Records
// Description: Gateway payment records, cancel payloads, and rejections.
// Purpose: Model the gateway's authoritative payment view and its errors.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`GatewayPaymentRecord`] is the gateway's view of a payment and is treated
//! as authoritative: local state converges to it, never the reverse.
//! [`GatewayRejection`] preserves the raw gateway response body so operators
//! can diagnose payment-state mismatches.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::IdempotencyKey;
use crate::core::identifiers::PaymentId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Gateway error codes that mean the payment is already cancelled.
const ALREADY_CANCELLED_CODES: &[&str] =
    &["PAYMENT_ALREADY_CANCELLED", "ALREADY_CANCELLED", "already_cancelled"];

// ============================================================================
// SECTION: Payment Records
// ============================================================================

/// Payment lifecycle status reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment created, not yet attempted.
    Ready,
    /// Payment awaiting asynchronous confirmation.
    #[serde(rename = "PAY_PENDING", alias = "PENDING")]
    Pending,
    /// Payment captured.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Payment fully cancelled.
    Cancelled,
    /// Payment partially cancelled.
    PartialCancelled,
    /// Virtual account issued, awaiting deposit.
    VirtualAccountIssued,
    /// Status not recognized by this client.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Returns the wire label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Pending => "PAY_PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::PartialCancelled => "PARTIAL_CANCELLED",
            Self::VirtualAccountIssued => "VIRTUAL_ACCOUNT_ISSUED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses a status label, accepting any case and `-` for `_`.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase().replace('-', "_");
        match upper.as_str() {
            "READY" => Some(Self::Ready),
            "PAY_PENDING" | "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "FAILED" => Some(Self::Failed),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            "PARTIAL_CANCELLED" | "PARTIAL_CANCELED" => Some(Self::PartialCancelled),
            "VIRTUAL_ACCOUNT_ISSUED" => Some(Self::VirtualAccountIssued),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gateway's authoritative view of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPaymentRecord {
    /// Gateway payment identifier.
    pub id: String,
    /// Current payment status.
    pub status: PaymentStatus,
    /// Total amount in minor currency units.
    pub amount: u64,
    /// Amount cancelled so far in minor currency units.
    #[serde(default)]
    pub cancelled_amount: u64,
    /// ISO currency code when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Merchant order reference when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Request timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<String>,
    /// Capture timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    /// Cancellation timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    /// Last update timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

// ============================================================================
// SECTION: Cancel Payloads
// ============================================================================

/// Cancel request body sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Human-readable cancellation reason.
    pub reason: String,
    /// Partial cancel amount; `None` cancels the remaining balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

/// Outcome of a successful cancel call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelResult {
    /// Payment the cancel was issued against.
    pub payment_id: PaymentId,
    /// Idempotency key sent with the request.
    pub idempotency_key: IdempotencyKey,
    /// Updated gateway record.
    pub record: GatewayPaymentRecord,
}

// ============================================================================
// SECTION: Gateway Rejection
// ============================================================================

/// Structured error returned by the gateway for a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayRejection {
    /// HTTP status code.
    pub status: u16,
    /// Gateway error code when the body carried one.
    pub code: Option<String>,
    /// Gateway error message, or a status summary.
    pub message: String,
    /// Raw response body, preserved for operator diagnosis.
    pub body: String,
}

impl GatewayRejection {
    /// Builds a rejection from a status and raw body, extracting `type`/`code`
    /// and `message` fields when the body is JSON.
    #[must_use]
    pub fn from_body(status: u16, body: String) -> Self {
        let parsed = serde_json::from_str::<Value>(&body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|value| value.get(name))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        let code = field("type").or_else(|| field("code"));
        let message =
            field("message").unwrap_or_else(|| format!("gateway returned status {status}"));
        Self {
            status,
            code,
            message,
            body,
        }
    }

    /// Returns true when the gateway reports the payment as already cancelled.
    #[must_use]
    pub fn is_already_cancelled(&self) -> bool {
        if let Some(code) = &self.code
            && ALREADY_CANCELLED_CODES.iter().any(|known| *known == code.as_str())
        {
            return true;
        }
        let message = self.message.to_ascii_lowercase();
        message.contains("already cancelled") || message.contains("already canceled")
    }
}

impl fmt::Display for GatewayRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "status {} ({code}): {}", self.status, self.message),
            None => write!(f, "status {}: {}", self.status, self.message),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn unknown_status_deserializes_to_unknown() {
        let status: PaymentStatus = serde_json::from_str("\"PAYMENT_SCHEDULED\"").unwrap();
        assert_eq!(status, PaymentStatus::Unknown);
        let pending: PaymentStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(pending, PaymentStatus::Pending);
    }

    #[test]
    fn rejection_extracts_type_and_message() {
        let rejection = GatewayRejection::from_body(
            409,
            r#"{"type":"PAYMENT_ALREADY_CANCELLED","message":"already done"}"#.to_string(),
        );
        assert_eq!(rejection.code.as_deref(), Some("PAYMENT_ALREADY_CANCELLED"));
        assert_eq!(rejection.message, "already done");
        assert!(rejection.is_already_cancelled());
    }

    #[test]
    fn rejection_keeps_non_json_body_verbatim() {
        let rejection = GatewayRejection::from_body(400, "bad request".to_string());
        assert_eq!(rejection.code, None);
        assert_eq!(rejection.message, "gateway returned status 400");
        assert_eq!(rejection.body, "bad request");
        assert!(!rejection.is_already_cancelled());
    }

    #[test]
    fn record_defaults_optional_fields() {
        let record: GatewayPaymentRecord =
            serde_json::from_str(r#"{"id":"pay_x","status":"PAID","amount":1200}"#).unwrap();
        assert_eq!(record.cancelled_amount, 0);
        assert_eq!(record.order_id, None);
    }
}
