// crates/paygate-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Fake gateway, recording audit sink, and failing store.
// Purpose: Drive the reconciliation engine without a network.
// Dependencies: paygate-core
// ============================================================================

//! ## Overview
//! Shared fixtures for engine tests. The fake gateway records every probe and
//! cancel so tests can assert on what reached the wire.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use paygate_core::CancelRequest;
use paygate_core::EngineConfig;
use paygate_core::GatewayError;
use paygate_core::GatewayPaymentRecord;
use paygate_core::GatewayProbe;
use paygate_core::IdempotencyKey;
use paygate_core::InMemoryMappingStore;
use paygate_core::MappingStore;
use paygate_core::OrderReference;
use paygate_core::PaymentGateway;
use paygate_core::PaymentId;
use paygate_core::PaymentStatus;
use paygate_core::ProbeResult;
use paygate_core::ReconcileAuditEvent;
use paygate_core::ReconcileAuditSink;
use paygate_core::ReconciliationEngine;
use paygate_core::RetryPolicy;
use paygate_core::StoreError;

// ============================================================================
// SECTION: Records
// ============================================================================

/// Builds a gateway record with the given id, status, and amount.
pub fn record(id: &str, status: PaymentStatus, amount: u64) -> GatewayPaymentRecord {
    GatewayPaymentRecord {
        id: id.to_string(),
        status,
        amount,
        cancelled_amount: 0,
        currency: Some("KRW".to_string()),
        order_id: None,
        requested_at: None,
        paid_at: None,
        cancelled_at: None,
        updated_at: None,
    }
}

/// Retry policy without sleeping.
pub const fn instant_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

// ============================================================================
// SECTION: Fake Gateway
// ============================================================================

/// Cancel call observed by the fake gateway.
#[derive(Debug, Clone)]
pub struct ObservedCancel {
    pub payment_id: String,
    pub request: CancelRequest,
    pub idempotency_key: String,
}

#[derive(Default)]
struct FakeState {
    records: BTreeMap<String, GatewayPaymentRecord>,
    orders: BTreeMap<String, GatewayPaymentRecord>,
    probes: Vec<String>,
    order_probes: Vec<String>,
    cancels: Vec<ObservedCancel>,
    failing_reads: u32,
    read_error: Option<GatewayError>,
    cancel_error: Option<GatewayError>,
}

/// In-memory gateway with call recording.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payment under its id.
    pub fn with_payment(self, record: GatewayPaymentRecord) -> Self {
        self.state.lock().unwrap().records.insert(record.id.clone(), record);
        self
    }

    /// Registers a payment reachable through an order reference.
    pub fn with_order(self, order: &str, record: GatewayPaymentRecord) -> Self {
        self.state.lock().unwrap().orders.insert(order.to_string(), record);
        self
    }

    /// Makes the next `count` reads fail as unreachable.
    pub fn fail_reads(&self, count: u32) {
        self.state.lock().unwrap().failing_reads = count;
    }

    /// Makes every read fail with `error`.
    pub fn fail_reads_with(&self, error: GatewayError) {
        self.state.lock().unwrap().read_error = Some(error);
    }

    /// Makes every cancel fail with `error`.
    pub fn fail_cancels(&self, error: GatewayError) {
        self.state.lock().unwrap().cancel_error = Some(error);
    }

    pub fn probes(&self) -> Vec<String> {
        self.state.lock().unwrap().probes.clone()
    }

    pub fn order_probes(&self) -> Vec<String> {
        self.state.lock().unwrap().order_probes.clone()
    }

    pub fn cancels(&self) -> Vec<ObservedCancel> {
        self.state.lock().unwrap().cancels.clone()
    }

    fn take_failure(state: &mut FakeState) -> Option<GatewayError> {
        if let Some(error) = &state.read_error {
            return Some(error.clone());
        }
        if state.failing_reads == 0 {
            return None;
        }
        state.failing_reads -= 1;
        Some(GatewayError::unreachable("connection refused"))
    }
}

impl GatewayProbe for FakeGateway {
    fn probe(&self, candidate: &str) -> Result<ProbeResult, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.probes.push(candidate.to_string());
        if let Some(error) = Self::take_failure(&mut state) {
            return Err(error);
        }
        let record = state.records.get(candidate).cloned();
        Ok(record.map_or_else(ProbeResult::not_found, ProbeResult::found))
    }

    fn probe_order(&self, order: &OrderReference) -> Result<ProbeResult, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.order_probes.push(order.to_string());
        if let Some(error) = Self::take_failure(&mut state) {
            return Err(error);
        }
        Ok(state
            .orders
            .get(order.as_str())
            .cloned()
            .map_or_else(ProbeResult::not_found, ProbeResult::found))
    }
}

impl PaymentGateway for FakeGateway {
    fn cancel(
        &self,
        payment_id: &PaymentId,
        request: &CancelRequest,
        idempotency_key: &IdempotencyKey,
    ) -> Result<GatewayPaymentRecord, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.cancels.push(ObservedCancel {
            payment_id: payment_id.to_string(),
            request: request.clone(),
            idempotency_key: idempotency_key.to_string(),
        });
        if let Some(error) = state.cancel_error.clone() {
            return Err(error);
        }
        let mut record = state
            .records
            .get(payment_id.as_str())
            .cloned()
            .unwrap_or_else(|| record(payment_id.as_str(), PaymentStatus::Paid, 0));
        record.cancelled_amount = request.amount.unwrap_or(record.amount);
        record.status = if record.cancelled_amount < record.amount {
            PaymentStatus::PartialCancelled
        } else {
            PaymentStatus::Cancelled
        };
        state.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }
}

// ============================================================================
// SECTION: Stores and Sinks
// ============================================================================

/// Mapping store that always fails.
pub struct FailingStore;

impl MappingStore for FailingStore {
    fn lookup(&self, _raw: &str) -> Result<Option<PaymentId>, StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    fn upsert(&self, _raw: &str, _payment_id: &PaymentId) -> Result<(), StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }
}

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<ReconcileAuditEvent>>,
}

impl RecordingAuditSink {
    pub fn events(&self) -> Vec<ReconcileAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|item| item.event == event).count()
    }
}

impl ReconcileAuditSink for RecordingAuditSink {
    fn record(&self, event: &ReconcileAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Engine over a fake gateway and fresh in-memory store, without sleeps.
pub fn engine(gateway: FakeGateway) -> ReconciliationEngine<FakeGateway, InMemoryMappingStore> {
    let config = EngineConfig {
        retry: instant_retry(3),
        ..EngineConfig::default()
    };
    ReconciliationEngine::new(gateway, InMemoryMappingStore::new(), config)
}
