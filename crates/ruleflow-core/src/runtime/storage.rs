// crates/ruleflow-core/src/runtime/storage.rs
// ============================================================================
// Module: In-Memory Storage
// Description: Process-local counter storage.
// Purpose: Provide a deterministic storage implementation without external deps.
// Dependencies: crate::interfaces, serde_json
// ============================================================================

//! ## Overview
//! [`MemoryStorage`] keeps counters in a mutex-guarded map. Clones share the
//! same map, so one instance can back several scopes. Nothing is persisted
//! across restarts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;

use crate::interfaces::Storage;
use crate::interfaces::StorageError;

// ============================================================================
// SECTION: Memory Storage
// ============================================================================

/// In-memory counter storage for tests and single-process hosts.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    /// Stored values protected by a mutex.
    values: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.lock()?.is_empty())
    }

    /// Returns every stored key, in order.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store mutex is poisoned.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    /// Locks the value map.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>, StorageError> {
        self.values.lock().map_err(|_| StorageError::Backend("memory storage mutex poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn set(&self, key: &str, value: Value) -> Result<Option<Value>, StorageError> {
        Ok(self.lock()?.insert(key.to_string(), value))
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }
}
