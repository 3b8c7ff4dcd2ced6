// crates/paygate-core/src/audit.rs
// ============================================================================
// Module: Reconciliation Audit Logging
// Description: Structured audit events for probes, resolutions, and cancels.
// Purpose: Emit JSON-line audit logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for reconciliation.
//! Every gateway probe, resolution, cancel, and reconcile produces one event
//! so operators can reconstruct how an identifier was mapped. Events never
//! carry credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::CandidateKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label attached to audit events.
///
/// # Invariants
/// - Variants are stable for log consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Probe recognized the identifier.
    Found,
    /// Probe did not recognize the identifier.
    NotFound,
    /// Identifier resolved to a confirmed payment id.
    Resolved,
    /// Resolution exhausted every path.
    ResolutionFailed,
    /// Gateway failure (transport, rejection, or invalid response).
    GatewayError,
    /// Cancel accepted by the gateway.
    Cancelled,
    /// Local order matches the gateway record.
    InSync,
    /// Local order diverges from the gateway record.
    Drift,
    /// Mapping store failure.
    StoreError,
}

/// Reconciliation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Outcome label.
    pub outcome: AuditOutcome,
    /// Raw identifier under reconciliation.
    pub raw_identifier: Option<String>,
    /// Caller order reference when supplied.
    pub order_reference: Option<String>,
    /// Candidate probed, for probe events.
    pub candidate: Option<String>,
    /// Candidate derivation label, for probe events.
    pub candidate_kind: Option<CandidateKind>,
    /// Confirmed payment id.
    pub payment_id: Option<String>,
    /// Number of gateway attempts or probes.
    pub attempts: Option<u32>,
    /// Idempotency key, for cancel events.
    pub idempotency_key: Option<String>,
    /// Free-form detail (error summary, drift description).
    pub detail: Option<String>,
}

/// Optional inputs for an audit event.
#[derive(Debug, Clone, Default)]
pub struct AuditEventParams {
    /// Raw identifier under reconciliation.
    pub raw_identifier: Option<String>,
    /// Caller order reference when supplied.
    pub order_reference: Option<String>,
    /// Candidate probed.
    pub candidate: Option<String>,
    /// Candidate derivation label.
    pub candidate_kind: Option<CandidateKind>,
    /// Confirmed payment id.
    pub payment_id: Option<String>,
    /// Number of gateway attempts or probes.
    pub attempts: Option<u32>,
    /// Idempotency key.
    pub idempotency_key: Option<String>,
    /// Free-form detail.
    pub detail: Option<String>,
}

impl ReconcileAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(event: &'static str, outcome: AuditOutcome, params: AuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            outcome,
            raw_identifier: params.raw_identifier,
            order_reference: params.order_reference,
            candidate: params.candidate,
            candidate_kind: params.candidate_kind,
            payment_id: params.payment_id,
            attempts: params.attempts,
            idempotency_key: params.idempotency_key,
            detail: params.detail,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for reconciliation events.
pub trait ReconcileAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &ReconcileAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ReconcileAuditSink for StderrAuditSink {
    fn record(&self, event: &ReconcileAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ReconcileAuditSink for FileAuditSink {
    fn record(&self, event: &ReconcileAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ReconcileAuditSink for NoopAuditSink {
    fn record(&self, _event: &ReconcileAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let sink = FileAuditSink::new(&path).unwrap();
        sink.record(&ReconcileAuditEvent::new(
            "payment_probe",
            AuditOutcome::NotFound,
            AuditEventParams {
                candidate: Some("pay_abc".to_string()),
                candidate_kind: Some(CandidateKind::Prefixed),
                ..AuditEventParams::default()
            },
        ));
        sink.record(&ReconcileAuditEvent::new(
            "payment_resolution",
            AuditOutcome::Resolved,
            AuditEventParams::default(),
        ));
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "payment_probe");
        assert_eq!(first["outcome"], "not_found");
        assert_eq!(first["candidate_kind"], "prefixed");
    }
}
