// crates/paygate-core/src/runtime/mod.rs
// ============================================================================
// Module: Paygate Runtime
// Description: Reconciliation engine, retry policy, and in-memory store.
// Purpose: Execute resolution, cancel, and reconcile against injected backends.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime components drive the gateway through the interfaces layer. The
//! engine is synchronous; callers own any threading.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod engine;
pub mod retry;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::DEFAULT_CANCEL_REASON;
pub use engine::Drift;
pub use engine::EngineConfig;
pub use engine::LocalOrder;
pub use engine::ReconcileError;
pub use engine::ReconciliationEngine;
pub use engine::ReconciliationReport;
pub use engine::Resolution;
pub use engine::ResolutionSource;
pub use engine::ResolveRequest;
pub use retry::RetryFailure;
pub use retry::RetryPolicy;
pub use retry::retry_read;
pub use store::InMemoryMappingStore;
