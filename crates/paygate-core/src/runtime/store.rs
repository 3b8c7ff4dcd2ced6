// crates/paygate-core/src/runtime/store.rs
// ============================================================================
// Module: Paygate In-Memory Mapping Store
// Description: Simple in-memory identifier-mapping store.
// Purpose: Provide a mapping cache for tests and single-process use.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`MappingStore`] for
//! tests and short-lived processes. Mappings do not survive a restart; use
//! the `SQLite` store for durable caching.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::PaymentId;
use crate::interfaces::MappingStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory identifier-mapping store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMappingStore {
    /// Mapping table protected by a mutex.
    entries: Arc<Mutex<BTreeMap<String, PaymentId>>>,
}

impl InMemoryMappingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |guard| guard.len())
    }

    /// Returns true when no mapping is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MappingStore for InMemoryMappingStore {
    fn lookup(&self, raw: &str) -> Result<Option<PaymentId>, StoreError> {
        let guard =
            self.entries.lock().map_err(|_| StoreError::Store("mutex poisoned".to_string()))?;
        Ok(guard.get(raw).cloned())
    }

    fn upsert(&self, raw: &str, payment_id: &PaymentId) -> Result<(), StoreError> {
        if raw.is_empty() {
            return Err(StoreError::Invalid("raw identifier must be non-empty".to_string()));
        }
        let mut guard =
            self.entries.lock().map_err(|_| StoreError::Store("mutex poisoned".to_string()))?;
        guard.insert(raw.to_string(), payment_id.clone());
        drop(guard);
        Ok(())
    }
}
