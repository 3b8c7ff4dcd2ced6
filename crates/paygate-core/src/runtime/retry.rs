// crates/paygate-core/src/runtime/retry.rs
// ============================================================================
// Module: Read Retry Policy
// Description: Bounded exponential backoff for idempotent gateway reads.
// Purpose: Ride out transient gateway outages without hanging callers.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! [`RetryPolicy`] bounds how often an idempotent read is re-attempted after a
//! transient [`GatewayError`]. Non-transient errors are returned immediately.
//! Mutating calls never go through this path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use crate::interfaces::GatewayError;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Retry bounds for idempotent reads.
///
/// # Invariants
/// - `max_attempts` counts the first attempt; zero is treated as one.
/// - Backoff doubles per attempt and never exceeds `max_backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Policy that performs a single attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Returns the delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1_u32 << exponent).min(self.max_backoff)
    }
}

/// Failed read after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    /// Final error observed.
    pub error: GatewayError,
    /// Number of attempts made.
    pub attempts: u32,
}

/// Runs `operation` under `policy`, retrying only transient gateway errors.
///
/// # Errors
///
/// Returns [`RetryFailure`] with the last error once a non-transient error is
/// seen or attempts are exhausted.
pub fn retry_read<T, F>(policy: &RetryPolicy, mut operation: F) -> Result<T, RetryFailure>
where
    F: FnMut() -> Result<T, GatewayError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && attempt < max_attempts => {
                thread::sleep(policy.backoff_after(attempt));
                attempt += 1;
            }
            Err(error) => {
                return Err(RetryFailure {
                    error,
                    attempts: attempt,
                });
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use std::cell::Cell;

    use super::*;

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff_after(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_after(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_after(3), Duration::from_millis(350));
    }

    #[test]
    fn transient_errors_are_retried_until_success() {
        let calls = Cell::new(0);
        let result = retry_read(&instant_policy(3), || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 { Err(GatewayError::unreachable("timeout")) } else { Ok(7) }
        });
        assert_eq!(result, Ok(7));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausted_retries_report_attempts() {
        let result: Result<(), _> =
            retry_read(&instant_policy(3), || Err(GatewayError::unreachable("down")));
        let failure = result.unwrap_err();
        assert_eq!(failure.attempts, 3);
        assert!(failure.error.is_transient());
    }

    #[test]
    fn non_transient_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = retry_read(&instant_policy(3), || {
            calls.set(calls.get() + 1);
            Err(GatewayError::InvalidResponse {
                detail: "bad json".to_string(),
                body: "{".to_string(),
            })
        });
        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.get(), 1);
    }
}
