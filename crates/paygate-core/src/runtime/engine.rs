// crates/paygate-core/src/runtime/engine.rs
// ============================================================================
// Module: Reconciliation Engine
// Description: Identifier resolution, cancel, status, and order reconciliation.
// Purpose: Find the one gateway payment id for a local order and act on it.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The reconciliation engine is the single execution path for mapping a
//! locally stored identifier to the gateway's payment id. Resolution order:
//! mapping cache, normalized form, generated candidates, then the
//! order-reference lookup. Probes are sequential and stop at the first hit.
//! Reads are retried on transient failures; cancels are sent exactly once
//! with a fresh idempotency key and never retried by the engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::audit::AuditEventParams;
use crate::audit::AuditOutcome;
use crate::audit::NoopAuditSink;
use crate::audit::ReconcileAuditEvent;
use crate::audit::ReconcileAuditSink;
use crate::core::CancelRequest;
use crate::core::CancelResult;
use crate::core::CandidateGenerator;
use crate::core::CandidateKind;
use crate::core::GatewayPaymentRecord;
use crate::core::GatewayRejection;
use crate::core::IdempotencyKey;
use crate::core::OrderReference;
use crate::core::PaymentId;
use crate::core::PaymentStatus;
use crate::core::normalize;
use crate::interfaces::GatewayError;
use crate::interfaces::MappingStore;
use crate::interfaces::PaymentGateway;
use crate::interfaces::ProbeResult;
use crate::runtime::retry::RetryFailure;
use crate::runtime::retry::RetryPolicy;
use crate::runtime::retry::retry_read;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Reason sent with a cancel when the caller supplies none.
pub const DEFAULT_CANCEL_REASON: &str = "Cancelled by merchant request";

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Retry policy for idempotent reads.
    pub retry: RetryPolicy,
    /// Reason substituted for a missing or blank cancel reason.
    pub default_cancel_reason: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            default_cancel_reason: DEFAULT_CANCEL_REASON.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Requests and Results
// ============================================================================

/// Inputs for resolving a local order to a gateway payment id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    /// Locally stored identifier; may be missing for legacy rows.
    pub raw_identifier: Option<String>,
    /// Caller order reference used for the secondary lookup.
    pub order_reference: Option<OrderReference>,
}

impl ResolveRequest {
    /// Creates a request for a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw_identifier: Some(raw.into()),
            order_reference: None,
        }
    }

    /// Adds an order reference for the secondary lookup path.
    #[must_use]
    pub fn with_order_reference(mut self, order: impl Into<OrderReference>) -> Self {
        self.order_reference = Some(order.into());
        self
    }

    /// Returns the trimmed raw identifier, or `None` when missing or blank.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw_identifier.as_deref().map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Which path confirmed the payment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Previously confirmed mapping.
    Cache,
    /// Normalized form of the raw identifier.
    Normalized,
    /// One of the generated candidates.
    Candidate,
    /// Order-reference lookup.
    OrderLookup,
}

/// Confirmed payment id and how it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Gateway-confirmed payment id.
    pub payment_id: PaymentId,
    /// Resolution path.
    pub source: ResolutionSource,
    /// Winning candidate derivation, for candidate resolutions.
    pub candidate_kind: Option<CandidateKind>,
    /// Number of gateway lookups performed (excluding retries).
    pub probes: u32,
    /// Gateway record when a lookup returned one; `None` for cache hits.
    pub record: Option<GatewayPaymentRecord>,
}

/// Locally stored order state to compare against the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOrder {
    /// Locally stored payment identifier.
    pub raw_identifier: Option<String>,
    /// Local order reference.
    pub order_reference: Option<OrderReference>,
    /// Status recorded locally.
    pub status: PaymentStatus,
    /// Amount recorded locally, in minor units.
    pub amount: u64,
}

/// A difference between local order state and the gateway record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Drift {
    /// Status differs.
    Status {
        /// Local status.
        local: PaymentStatus,
        /// Gateway status.
        gateway: PaymentStatus,
    },
    /// Amount differs.
    Amount {
        /// Local amount.
        local: u64,
        /// Gateway amount.
        gateway: u64,
    },
}

/// Comparison of a local order with its gateway record.
///
/// # Invariants
/// - `converged_status` is always the gateway's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Confirmed payment id.
    pub payment_id: PaymentId,
    /// Resolution path.
    pub source: ResolutionSource,
    /// Gateway record.
    pub record: GatewayPaymentRecord,
    /// Differences found, empty when in sync.
    pub drifts: Vec<Drift>,
    /// Status the local order must converge to.
    pub converged_status: PaymentStatus,
}

impl ReconciliationReport {
    /// Returns true when the local order matches the gateway.
    #[must_use]
    pub fn is_in_sync(&self) -> bool {
        self.drifts.is_empty()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reconciliation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Caller input rejected before contacting the gateway.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// No candidate or order lookup was recognized by the gateway.
    #[error("resolution failed for '{raw}' after {probes} gateway lookups")]
    ResolutionFailed {
        /// Raw identifier (empty when missing).
        raw: String,
        /// Number of lookups performed.
        probes: u32,
        /// Whether the order-reference lookup ran.
        order_lookup_attempted: bool,
    },
    /// Gateway unreachable (transport failure, timeout, or 5xx).
    #[error("gateway unreachable after {attempts} attempt(s): {detail}")]
    GatewayUnreachable {
        /// Attempts made.
        attempts: u32,
        /// Failure summary.
        detail: String,
        /// Response body when the gateway answered.
        body: Option<String>,
    },
    /// Gateway rejected a well-formed request.
    #[error("gateway rejected request: {0}")]
    GatewayRejected(GatewayRejection),
    /// Gateway response could not be interpreted.
    #[error("gateway returned an invalid response: {detail}")]
    InvalidResponse {
        /// Failure summary.
        detail: String,
        /// Raw response body.
        body: String,
    },
}

impl ReconcileError {
    /// Maps a gateway error observed after `attempts` attempts.
    fn from_gateway(error: GatewayError, attempts: u32) -> Self {
        match error {
            GatewayError::Unreachable {
                detail,
                body,
            } => Self::GatewayUnreachable {
                attempts,
                detail,
                body,
            },
            GatewayError::Rejected(rejection) => Self::GatewayRejected(rejection),
            GatewayError::InvalidRequest(detail) => Self::InvalidInput(detail),
            GatewayError::InvalidResponse {
                detail,
                body,
            } => Self::InvalidResponse {
                detail,
                body,
            },
        }
    }

    /// Returns the raw gateway response body attached to the error.
    #[must_use]
    pub fn gateway_body(&self) -> Option<&str> {
        match self {
            Self::GatewayUnreachable {
                body, ..
            } => body.as_deref(),
            Self::GatewayRejected(rejection) => Some(rejection.body.as_str()),
            Self::InvalidResponse {
                body, ..
            } => Some(body.as_str()),
            Self::InvalidInput(_) | Self::ResolutionFailed { .. } => None,
        }
    }

    /// Returns true when the gateway says the payment is already cancelled.
    #[must_use]
    pub fn is_already_cancelled(&self) -> bool {
        matches!(self, Self::GatewayRejected(rejection) if rejection.is_already_cancelled())
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::ResolutionFailed { .. } => "resolution_failed",
            Self::GatewayUnreachable { .. } => "gateway_unreachable",
            Self::GatewayRejected(_) => "gateway_rejected",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }
}

impl From<RetryFailure> for ReconcileError {
    fn from(failure: RetryFailure) -> Self {
        Self::from_gateway(failure.error, failure.attempts)
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Reconciliation engine over an injected gateway and mapping store.
pub struct ReconciliationEngine<G, S> {
    /// Gateway implementation.
    gateway: G,
    /// Identifier-mapping store.
    store: S,
    /// Candidate generator.
    generator: CandidateGenerator,
    /// Audit sink.
    audit: Arc<dyn ReconcileAuditSink>,
    /// Engine configuration.
    config: EngineConfig,
}

impl<G, S> ReconciliationEngine<G, S>
where
    G: PaymentGateway,
    S: MappingStore,
{
    /// Creates an engine with a no-op audit sink and the system clock.
    #[must_use]
    pub fn new(gateway: G, store: S, config: EngineConfig) -> Self {
        Self {
            gateway,
            store,
            generator: CandidateGenerator::new(),
            audit: Arc::new(NoopAuditSink),
            config,
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn ReconcileAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the candidate generator.
    #[must_use]
    pub fn with_generator(mut self, generator: CandidateGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Returns the gateway implementation.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns the mapping store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Resolves a local identifier to the gateway's payment id.
    ///
    /// A cached mapping is returned without contacting the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::ResolutionFailed`] when nothing matches, or a
    /// gateway error that aborted the search.
    pub fn resolve(&self, request: &ResolveRequest) -> Result<Resolution, ReconcileError> {
        if let Some(raw) = request.raw()
            && let Some(payment_id) = self.cached(raw, request)
        {
            let resolution = Resolution {
                payment_id,
                source: ResolutionSource::Cache,
                candidate_kind: None,
                probes: 0,
                record: None,
            };
            self.emit_resolution(request, &resolution);
            return Ok(resolution);
        }
        self.search(request).map(|(resolution, _)| resolution)
    }

    /// Resolves the identifier and returns the gateway's current record.
    ///
    /// A cached mapping the gateway no longer recognizes triggers a fresh
    /// search.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] under the same conditions as [`Self::resolve`].
    pub fn status(&self, request: &ResolveRequest) -> Result<GatewayPaymentRecord, ReconcileError> {
        self.resolve_with_record(request).map(|(_, record)| record)
    }

    /// Cancels a confirmed payment.
    ///
    /// Every call draws a new idempotency key. A missing or blank reason is
    /// replaced with the configured default. The request is never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidInput`] for a zero amount, otherwise
    /// the gateway failure with its raw response body attached.
    pub fn cancel(
        &self,
        payment_id: &PaymentId,
        reason: Option<&str>,
        amount: Option<u64>,
    ) -> Result<CancelResult, ReconcileError> {
        let request = self.cancel_request(reason, amount)?;
        self.send_cancel(payment_id, &request)
    }

    /// Resolves the identifier, then cancels it. No cancel is sent when
    /// resolution fails.
    ///
    /// # Errors
    ///
    /// Returns the resolution error or the cancel error.
    pub fn resolve_and_cancel(
        &self,
        request: &ResolveRequest,
        reason: Option<&str>,
        amount: Option<u64>,
    ) -> Result<CancelResult, ReconcileError> {
        let cancel = self.cancel_request(reason, amount)?;
        let resolution = self.resolve(request)?;
        self.send_cancel(&resolution.payment_id, &cancel)
    }

    /// Compares a local order with the gateway's record.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError`] when the order cannot be resolved.
    pub fn reconcile(&self, order: &LocalOrder) -> Result<ReconciliationReport, ReconcileError> {
        let request = ResolveRequest {
            raw_identifier: order.raw_identifier.clone(),
            order_reference: order.order_reference.clone(),
        };
        let (resolution, record) = self.resolve_with_record(&request)?;
        let mut drifts = Vec::new();
        if order.status != record.status {
            drifts.push(Drift::Status {
                local: order.status,
                gateway: record.status,
            });
        }
        if order.amount != record.amount {
            drifts.push(Drift::Amount {
                local: order.amount,
                gateway: record.amount,
            });
        }
        let report = ReconciliationReport {
            payment_id: resolution.payment_id,
            source: resolution.source,
            converged_status: record.status,
            record,
            drifts,
        };
        let outcome = if report.is_in_sync() { AuditOutcome::InSync } else { AuditOutcome::Drift };
        let detail = (!report.is_in_sync()).then(|| describe_drifts(&report.drifts));
        self.emit(
            "payment_reconcile",
            outcome,
            AuditEventParams {
                payment_id: Some(report.payment_id.to_string()),
                detail,
                ..request_params(&request)
            },
        );
        Ok(report)
    }
}

// ============================================================================
// SECTION: Engine Internals
// ============================================================================

impl<G, S> ReconciliationEngine<G, S>
where
    G: PaymentGateway,
    S: MappingStore,
{
    /// Resolves and guarantees a fresh gateway record.
    fn resolve_with_record(
        &self,
        request: &ResolveRequest,
    ) -> Result<(Resolution, GatewayPaymentRecord), ReconcileError> {
        let resolution = self.resolve(request)?;
        if let Some(record) = resolution.record.clone() {
            return Ok((resolution, record));
        }
        let mut probes = 0;
        let cached = resolution.payment_id.as_str();
        let params = AuditEventParams {
            candidate: Some(cached.to_string()),
            ..request_params(request)
        };
        if let Some(record) = self.run_probe(params, &mut probes, || self.gateway.probe(cached))? {
            return Ok((
                Resolution {
                    probes,
                    record: Some(record.clone()),
                    ..resolution
                },
                record,
            ));
        }
        self.emit(
            "mapping_store_error",
            AuditOutcome::StoreError,
            AuditEventParams {
                payment_id: Some(cached.to_string()),
                detail: Some("cached payment id no longer recognized by gateway".to_string()),
                ..request_params(request)
            },
        );
        self.search(request)
    }

    /// Runs the uncached search and records the outcome.
    fn search(
        &self,
        request: &ResolveRequest,
    ) -> Result<(Resolution, GatewayPaymentRecord), ReconcileError> {
        match self.search_paths(request) {
            Ok((resolution, record)) => {
                if let Some(raw) = request.raw()
                    && let Err(err) = self.store.upsert(raw, &resolution.payment_id)
                {
                    self.emit_store_error(request, &err.to_string());
                }
                self.emit_resolution(request, &resolution);
                Ok((resolution, record))
            }
            Err(err) => {
                self.emit(
                    "payment_resolution",
                    if matches!(err, ReconcileError::ResolutionFailed { .. }) {
                        AuditOutcome::ResolutionFailed
                    } else {
                        AuditOutcome::GatewayError
                    },
                    AuditEventParams {
                        detail: Some(err.to_string()),
                        ..request_params(request)
                    },
                );
                Err(err)
            }
        }
    }

    /// Probes the normalized form, then candidates, then the order reference.
    fn search_paths(
        &self,
        request: &ResolveRequest,
    ) -> Result<(Resolution, GatewayPaymentRecord), ReconcileError> {
        let raw = request.raw();
        let mut probes = 0;
        let mut probed: Vec<String> = Vec::new();

        if let Some(raw) = raw {
            let direct = normalize(raw);
            let params = candidate_params(request, direct.as_str(), CandidateKind::Normalized);
            if let Some(record) =
                self.run_probe(params, &mut probes, || self.gateway.probe(direct.as_str()))?
            {
                return Ok(found(
                    PaymentId::from(direct),
                    ResolutionSource::Normalized,
                    Some(CandidateKind::Normalized),
                    probes,
                    record,
                ));
            }
            probed.push(direct.into());
        }

        for candidate in &self.generator.generate(raw) {
            if probed.contains(&candidate.value) {
                continue;
            }
            let value = candidate.value.as_str();
            let params = candidate_params(request, value, candidate.kind);
            if let Some(record) =
                self.run_probe(params, &mut probes, || self.gateway.probe(value))?
            {
                return Ok(found(
                    PaymentId::new(value),
                    ResolutionSource::Candidate,
                    Some(candidate.kind),
                    probes,
                    record,
                ));
            }
            probed.push(candidate.value.clone());
        }

        if let Some(order) = &request.order_reference {
            let params = request_params(request);
            if let Some(record) =
                self.run_probe(params, &mut probes, || self.gateway.probe_order(order))?
            {
                if record.id.trim().is_empty() {
                    return Err(ReconcileError::InvalidResponse {
                        detail: "order lookup returned a record without an id".to_string(),
                        body: serde_json::to_string(&record).unwrap_or_default(),
                    });
                }
                return Ok(found(
                    PaymentId::new(record.id.clone()),
                    ResolutionSource::OrderLookup,
                    None,
                    probes,
                    record,
                ));
            }
        }

        Err(ReconcileError::ResolutionFailed {
            raw: raw.unwrap_or_default().to_string(),
            probes,
            order_lookup_attempted: request.order_reference.is_some(),
        })
    }

    /// Runs one logical lookup under the retry policy and audits it.
    fn run_probe<F>(
        &self,
        params: AuditEventParams,
        probes: &mut u32,
        lookup: F,
    ) -> Result<Option<GatewayPaymentRecord>, ReconcileError>
    where
        F: FnMut() -> Result<ProbeResult, GatewayError>,
    {
        *probes += 1;
        match retry_read(&self.config.retry, lookup) {
            Ok(ProbeResult {
                valid: true,
                record: Some(record),
            }) => {
                self.emit(
                    "payment_probe",
                    AuditOutcome::Found,
                    AuditEventParams {
                        payment_id: Some(record.id.clone()),
                        ..params
                    },
                );
                Ok(Some(record))
            }
            Ok(_) => {
                self.emit("payment_probe", AuditOutcome::NotFound, params);
                Ok(None)
            }
            Err(failure) => {
                let attempts = failure.attempts;
                let err = ReconcileError::from(failure);
                self.emit(
                    "payment_probe",
                    AuditOutcome::GatewayError,
                    AuditEventParams {
                        attempts: Some(attempts),
                        detail: Some(err.to_string()),
                        ..params
                    },
                );
                Err(err)
            }
        }
    }

    /// Looks up a cached mapping; store failures degrade to a miss.
    fn cached(&self, raw: &str, request: &ResolveRequest) -> Option<PaymentId> {
        match self.store.lookup(raw) {
            Ok(cached) => cached,
            Err(err) => {
                self.emit_store_error(request, &err.to_string());
                None
            }
        }
    }

    /// Builds the cancel body, applying the default reason.
    fn cancel_request(
        &self,
        reason: Option<&str>,
        amount: Option<u64>,
    ) -> Result<CancelRequest, ReconcileError> {
        if amount == Some(0) {
            return Err(ReconcileError::InvalidInput(
                "cancel amount must be greater than zero".to_string(),
            ));
        }
        let reason = reason
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.config.default_cancel_reason.as_str());
        Ok(CancelRequest {
            reason: reason.to_string(),
            amount,
        })
    }

    /// Sends a cancel exactly once with a fresh idempotency key.
    fn send_cancel(
        &self,
        payment_id: &PaymentId,
        request: &CancelRequest,
    ) -> Result<CancelResult, ReconcileError> {
        let idempotency_key = IdempotencyKey::generate();
        let params = AuditEventParams {
            payment_id: Some(payment_id.to_string()),
            idempotency_key: Some(idempotency_key.to_string()),
            attempts: Some(1),
            ..AuditEventParams::default()
        };
        match self.gateway.cancel(payment_id, request, &idempotency_key) {
            Ok(record) => {
                self.emit("payment_cancel", AuditOutcome::Cancelled, params);
                Ok(CancelResult {
                    payment_id: payment_id.clone(),
                    idempotency_key,
                    record,
                })
            }
            Err(error) => {
                let err = ReconcileError::from_gateway(error, 1);
                let detail = match err.gateway_body() {
                    Some(body) => format!("{err}; body: {body}"),
                    None => err.to_string(),
                };
                self.emit(
                    "payment_cancel",
                    AuditOutcome::GatewayError,
                    AuditEventParams {
                        detail: Some(detail),
                        ..params
                    },
                );
                Err(err)
            }
        }
    }

    /// Records a successful resolution.
    fn emit_resolution(&self, request: &ResolveRequest, resolution: &Resolution) {
        self.emit(
            "payment_resolution",
            AuditOutcome::Resolved,
            AuditEventParams {
                payment_id: Some(resolution.payment_id.to_string()),
                candidate_kind: resolution.candidate_kind,
                attempts: Some(resolution.probes),
                detail: Some(format!("source={}", source_label(resolution.source))),
                ..request_params(request)
            },
        );
    }

    /// Records a mapping store failure.
    fn emit_store_error(&self, request: &ResolveRequest, detail: &str) {
        self.emit(
            "mapping_store_error",
            AuditOutcome::StoreError,
            AuditEventParams {
                detail: Some(detail.to_string()),
                ..request_params(request)
            },
        );
    }

    /// Sends an event to the audit sink.
    fn emit(&self, event: &'static str, outcome: AuditOutcome, params: AuditEventParams) {
        self.audit.record(&ReconcileAuditEvent::new(event, outcome, params));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a resolution plus record pair for a successful lookup.
fn found(
    payment_id: PaymentId,
    source: ResolutionSource,
    candidate_kind: Option<CandidateKind>,
    probes: u32,
    record: GatewayPaymentRecord,
) -> (Resolution, GatewayPaymentRecord) {
    (
        Resolution {
            payment_id,
            source,
            candidate_kind,
            probes,
            record: Some(record.clone()),
        },
        record,
    )
}

/// Audit parameters identifying the request.
fn request_params(request: &ResolveRequest) -> AuditEventParams {
    AuditEventParams {
        raw_identifier: request.raw_identifier.clone(),
        order_reference: request.order_reference.as_ref().map(ToString::to_string),
        ..AuditEventParams::default()
    }
}

/// Audit parameters for a candidate probe.
fn candidate_params(
    request: &ResolveRequest,
    value: &str,
    kind: CandidateKind,
) -> AuditEventParams {
    AuditEventParams {
        candidate: Some(value.to_string()),
        candidate_kind: Some(kind),
        ..request_params(request)
    }
}

/// Stable label for a resolution source.
const fn source_label(source: ResolutionSource) -> &'static str {
    match source {
        ResolutionSource::Cache => "cache",
        ResolutionSource::Normalized => "normalized",
        ResolutionSource::Candidate => "candidate",
        ResolutionSource::OrderLookup => "order_lookup",
    }
}

/// Renders drifts as a compact audit detail string.
fn describe_drifts(drifts: &[Drift]) -> String {
    drifts
        .iter()
        .map(|drift| match drift {
            Drift::Status {
                local,
                gateway,
            } => format!("status {local} -> {gateway}"),
            Drift::Amount {
                local,
                gateway,
            } => format!("amount {local} -> {gateway}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
