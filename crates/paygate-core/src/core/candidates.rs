// crates/paygate-core/src/core/candidates.rs
// ============================================================================
// Module: Candidate Generator
// Description: Ordered alternate encodings for a raw payment identifier.
// Purpose: Recover from legacy or drifted identifier formats deterministically.
// Dependencies: serde, crate::core::{identifiers, normalize}
// ============================================================================

//! ## Overview
//! When the normalized form of a stored identifier is not recognized by the
//! gateway, [`CandidateGenerator::generate`] produces the alternate encodings
//! worth probing, cheapest and most likely first. The set is deduplicated,
//! never empty, and identical for identical input so retries are idempotent.
//! A missing or blank identifier yields a single timestamp-derived fallback.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::identifiers::PAYMENT_ID_PREFIX;
use crate::core::normalize::clean;
use crate::core::normalize::fit_body;
use crate::core::normalize::normalize;
use crate::core::normalize::strip_prefix;
use crate::core::normalize::tail_body;

// ============================================================================
// SECTION: Types
// ============================================================================

/// How a candidate was derived from the raw identifier.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// Raw identifier, unmodified.
    Exact,
    /// Raw identifier with the prefix prepended.
    Prefixed,
    /// Raw identifier with hyphens removed.
    HyphenStripped,
    /// Hyphen-stripped identifier with the prefix prepended.
    HyphenStrippedPrefixed,
    /// First 8, middle 6, and last 8 hex characters of a UUID.
    UuidCondensed,
    /// Cleaned body truncated (head) or padded to 22 characters.
    Normalized,
    /// Last 22 characters of a cleaned body longer than 22.
    TailTruncated,
    /// Timestamp-derived placeholder for a missing identifier.
    TimestampFallback,
}

impl CandidateKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Prefixed => "prefixed",
            Self::HyphenStripped => "hyphen_stripped",
            Self::HyphenStrippedPrefixed => "hyphen_stripped_prefixed",
            Self::UuidCondensed => "uuid_condensed",
            Self::Normalized => "normalized",
            Self::TailTruncated => "tail_truncated",
            Self::TimestampFallback => "timestamp_fallback",
        }
    }
}

/// A single guessed encoding of a raw identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Candidate identifier string.
    pub value: String,
    /// Derivation label.
    pub kind: CandidateKind,
}

/// Ordered, deduplicated, non-empty list of candidates.
///
/// # Invariants
/// - At least one candidate.
/// - No two candidates share the same `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateSet(Vec<Candidate>);

impl CandidateSet {
    /// Returns the candidates in probe order.
    #[must_use]
    pub fn as_slice(&self) -> &[Candidate] {
        &self.0
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates candidate values in probe order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|candidate| candidate.value.as_str())
    }

    /// Appends a candidate unless an equal value is already present.
    fn push_unique(&mut self, value: String, kind: CandidateKind) {
        if value.is_empty() || self.0.iter().any(|existing| existing.value == value) {
            return;
        }
        self.0.push(Candidate {
            value,
            kind,
        });
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type IntoIter = std::slice::Iter<'a, Candidate>;
    type Item = &'a Candidate;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Source of the current time in milliseconds since the Unix epoch.
pub type ClockFn = fn() -> u128;

/// Produces candidate encodings for raw identifiers.
#[derive(Debug, Clone, Copy)]
pub struct CandidateGenerator {
    /// Clock used only for the missing-identifier fallback.
    clock: ClockFn,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self {
            clock: system_millis,
        }
    }
}

impl CandidateGenerator {
    /// Creates a generator that uses the system clock for fallbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with an injected fallback clock.
    #[must_use]
    pub const fn with_clock(clock: ClockFn) -> Self {
        Self {
            clock,
        }
    }

    /// Generates candidates for `raw`, most likely first.
    #[must_use]
    pub fn generate(&self, raw: Option<&str>) -> CandidateSet {
        let mut set = CandidateSet(Vec::new());
        let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
            let millis = (self.clock)().to_string();
            set.push_unique(prefixed(&fit_body(&millis)), CandidateKind::TimestampFallback);
            return set;
        };

        set.push_unique(raw.to_string(), CandidateKind::Exact);
        set.push_unique(prefixed(raw), CandidateKind::Prefixed);
        let stripped = raw.replace('-', "");
        set.push_unique(stripped.clone(), CandidateKind::HyphenStripped);
        set.push_unique(prefixed(&stripped), CandidateKind::HyphenStrippedPrefixed);
        if let Some(condensed) = condense_uuid(strip_prefix(raw.trim())) {
            set.push_unique(prefixed(&condensed), CandidateKind::UuidCondensed);
        }
        set.push_unique(normalize(raw).as_str().to_string(), CandidateKind::Normalized);
        if let Some(tail) = tail_body(&clean(strip_prefix(raw.trim()))) {
            set.push_unique(prefixed(&tail), CandidateKind::TailTruncated);
        }
        set
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Prepends the payment id prefix when it is missing.
fn prefixed(value: &str) -> String {
    if value.starts_with(PAYMENT_ID_PREFIX) {
        value.to_string()
    } else {
        format!("{PAYMENT_ID_PREFIX}{value}")
    }
}

/// Derives the 22-character `first8 + middle6 + last8` form of a UUID.
///
/// Accepts the hyphenated 8-4-4-4-12 form and the bare 32-hex form. Case is
/// preserved.
pub(crate) fn condense_uuid(value: &str) -> Option<String> {
    let hex = uuid_hex(value)?;
    Some(format!("{}{}{}", &hex[..8], &hex[8..14], &hex[24..32]))
}

/// Returns the 32 hex characters of a UUID-shaped string.
fn uuid_hex(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    match bytes.len() {
        36 => {
            let hyphens_ok = [8, 13, 18, 23].iter().all(|&index| bytes[index] == b'-');
            let hex: String = value.chars().filter(|ch| *ch != '-').collect();
            (hyphens_ok && hex.len() == 32 && hex.bytes().all(|byte| byte.is_ascii_hexdigit()))
                .then_some(hex)
        }
        32 => bytes.iter().all(u8::is_ascii_hexdigit).then(|| value.to_string()),
        _ => None,
    }
}

/// Returns the current Unix time in milliseconds.
fn system_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
