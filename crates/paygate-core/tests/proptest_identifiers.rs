// crates/paygate-core/tests/proptest_identifiers.rs
// ============================================================================
// Module: Identifier Property-Based Tests
// Description: Property tests for normalization and candidate generation.
// Purpose: Detect panics and invariant breaks across arbitrary identifiers.
// ============================================================================

//! Property-based tests for identifier normalization invariants.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use paygate_core::CandidateGenerator;
use paygate_core::CandidateKind;
use paygate_core::PAYMENT_ID_LEN;
use paygate_core::PAYMENT_ID_PREFIX;
use paygate_core::is_normalized;
use paygate_core::normalize;
use proptest::prelude::*;

fn fixed_clock() -> u128 {
    42
}

proptest! {
    #[test]
    fn normalize_always_conforms(raw in ".*") {
        let normalized = normalize(&raw);
        prop_assert!(is_normalized(normalized.as_str()));
        prop_assert_eq!(normalized.as_str().len(), PAYMENT_ID_LEN);
        prop_assert!(normalized.as_str().starts_with(PAYMENT_ID_PREFIX));
    }

    #[test]
    fn normalize_is_idempotent(raw in ".*") {
        let once = normalize(&raw);
        let twice = normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn uuid_like_inputs_normalize(
        raw in "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}"
    ) {
        let normalized = normalize(&raw);
        let expected: String = raw.chars().filter(|ch| *ch != '-').take(22).collect();
        prop_assert_eq!(normalized.body(), expected.as_str());
    }

    #[test]
    fn candidates_are_deterministic_and_unique(raw in "[ -~]{0,48}") {
        let generator = CandidateGenerator::with_clock(fixed_clock);
        let first = generator.generate(Some(&raw));
        let second = generator.generate(Some(&raw));
        prop_assert_eq!(&first, &second);

        let mut values: Vec<&str> = first.values().collect();
        prop_assert!(!values.is_empty());
        let total = values.len();
        values.sort_unstable();
        values.dedup();
        prop_assert_eq!(values.len(), total);
    }

    #[test]
    fn candidates_start_with_raw_and_include_normalized(raw in "[A-Za-z0-9_-]{1,48}") {
        let set = CandidateGenerator::new().generate(Some(&raw));
        let first = set.as_slice().first().unwrap();
        prop_assert_eq!(first.value.as_str(), raw.as_str());
        prop_assert_eq!(first.kind, CandidateKind::Exact);
        let normalized = normalize(&raw);
        prop_assert!(set.values().any(|value| value == normalized.as_str()));
    }
}

#[test]
fn blank_input_yields_single_fallback() {
    let generator = CandidateGenerator::with_clock(fixed_clock);
    for raw in [None, Some(""), Some("   ")] {
        let set = generator.generate(raw);
        assert_eq!(set.len(), 1);
        let candidate = &set.as_slice()[0];
        assert_eq!(candidate.kind, CandidateKind::TimestampFallback);
        assert_eq!(candidate.value, "pay_4200000000000000000000");
    }
}
