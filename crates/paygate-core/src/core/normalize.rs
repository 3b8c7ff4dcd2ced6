// crates/paygate-core/src/core/normalize.rs
// ============================================================================
// Module: Identifier Normalizer
// Description: Total mapping from raw identifiers to gateway payment ids.
// Purpose: Provide the cheap, deterministic fast path used before probing.
// Dependencies: crate::core::identifiers
// ============================================================================

//! ## Overview
//! [`normalize`] turns any raw identifier (UUID, timestamp-random order token,
//! or an already-conformant gateway id) into a syntactically valid
//! [`NormalizedPaymentId`]. It never fails. Whether the gateway actually knows
//! the result is a separate question answered by probing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::NormalizedPaymentId;
use crate::core::identifiers::PAYMENT_ID_BODY_LEN;
use crate::core::identifiers::PAYMENT_ID_FILLER;
use crate::core::identifiers::PAYMENT_ID_PREFIX;

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes a raw identifier into the gateway's payment id format.
///
/// Conformant input is returned unchanged. Otherwise the prefix (if present)
/// is set aside, every non-alphanumeric character is removed from the rest,
/// and the remainder is head-truncated or right-padded with
/// [`PAYMENT_ID_FILLER`] to 22 characters before the prefix is re-applied.
#[must_use]
pub fn normalize(raw: &str) -> NormalizedPaymentId {
    if let Some(id) = NormalizedPaymentId::parse(raw) {
        return id;
    }
    let body = strip_prefix(raw.trim());
    NormalizedPaymentId::from_fitted_body(&fit_body(&clean(body)))
}

/// Removes the payment id prefix when present.
pub(crate) fn strip_prefix(value: &str) -> &str {
    value.strip_prefix(PAYMENT_ID_PREFIX).unwrap_or(value)
}

/// Keeps only ASCII alphanumeric characters.
pub(crate) fn clean(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Truncates (keeping the head) or right-pads a cleaned body to 22 characters.
pub(crate) fn fit_body(cleaned: &str) -> String {
    let mut body: String = cleaned.chars().take(PAYMENT_ID_BODY_LEN).collect();
    while body.len() < PAYMENT_ID_BODY_LEN {
        body.push(PAYMENT_ID_FILLER);
    }
    body
}

/// Keeps the last 22 characters of a cleaned body longer than 22.
pub(crate) fn tail_body(cleaned: &str) -> Option<String> {
    let len = cleaned.len();
    (len > PAYMENT_ID_BODY_LEN).then(|| cleaned[len - PAYMENT_ID_BODY_LEN..].to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_identifier_is_prefixed_and_padded() {
        assert_eq!(normalize("abc123").as_str(), "pay_abc1230000000000000000");
    }

    #[test]
    fn uuid_hyphens_are_stripped_before_truncation() {
        let id = normalize("0196b315-25b4-27a5-c420-5abf1c4521ba");
        assert_eq!(id.as_str(), "pay_0196b31525b427a5c4205a");
    }

    #[test]
    fn prefixed_long_identifier_keeps_prefix_once() {
        let id = normalize("pay_0196b315-25b4-27a5-c420-5abf1c4521ba");
        assert_eq!(id.as_str(), "pay_0196b31525b427a5c4205a");
    }

    #[test]
    fn prefixed_short_identifier_is_padded() {
        assert_eq!(normalize("pay_xyz").as_str(), "pay_xyz0000000000000000000");
    }

    #[test]
    fn tail_body_only_applies_to_long_bodies() {
        assert_eq!(tail_body("abc"), None);
        assert_eq!(
            tail_body("0196b31525b427a5c4205abf1c4521ba").as_deref(),
            Some("b427a5c4205abf1c4521ba")
        );
    }
}
