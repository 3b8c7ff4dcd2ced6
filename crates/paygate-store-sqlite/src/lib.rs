// crates/paygate-store-sqlite/src/lib.rs
// ============================================================================
// Module: Paygate SQLite Store
// Description: Durable identifier-mapping cache backed by SQLite.
// Purpose: Persist confirmed raw identifier to payment id mappings.
// Dependencies: paygate-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This crate provides [`SqliteMappingStore`], a durable
//! [`paygate_core::MappingStore`] that survives restarts so confirmed
//! mappings skip the candidate search on later runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_RAW_IDENTIFIER_BYTES;
pub use store::MappingEntry;
pub use store::SqliteMappingStore;
pub use store::SqliteMappingStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
