// crates/ruleflow-adapters/src/cache.rs
// ============================================================================
// Module: In-Memory Cache Adapter
// Description: TTL-aware key-value cache backed by a mutex-guarded map.
// Purpose: Provide a deterministic cache implementation without external deps.
// Dependencies: ruleflow-core, serde_json, std
// ============================================================================

//! ## Overview
//! A simple in-process cache for rule-set hydration and result memoization.
//! Entries expire lazily: expired slots are dropped on the next read of
//! their key. Not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use ruleflow_core::interfaces::AdapterError;
use ruleflow_core::interfaces::CacheAdapter;
use serde_json::Value;

// ============================================================================
// SECTION: Cache Slots
// ============================================================================

/// One cached value with an optional expiry deadline.
#[derive(Debug, Clone)]
struct CacheSlot {
    /// Cached JSON value.
    value: Value,
    /// Deadline after which the slot is expired.
    expires_at: Option<Instant>,
}

impl CacheSlot {
    /// Returns true when the slot has passed its deadline.
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

// ============================================================================
// SECTION: In-Memory Cache
// ============================================================================

/// In-memory TTL cache for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct MemoryCacheAdapter {
    /// Slot map protected by a mutex.
    slots: Arc<Mutex<BTreeMap<String, CacheSlot>>>,
}

impl MemoryCacheAdapter {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns the number of live (unexpired) entries.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the mutex is poisoned.
    pub fn len(&self) -> Result<usize, AdapterError> {
        let now = Instant::now();
        let guard = self.lock()?;
        Ok(guard.values().filter(|slot| !slot.is_expired(now)).count())
    }

    /// Returns true when no live entries remain.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, AdapterError> {
        Ok(self.len()? == 0)
    }

    /// Locks the slot map.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, CacheSlot>>, AdapterError> {
        self.slots.lock().map_err(|_| AdapterError::Backend("cache mutex poisoned".to_string()))
    }
}

impl CacheAdapter for MemoryCacheAdapter {
    fn get(&self, key: &str) -> Result<Option<Value>, AdapterError> {
        let now = Instant::now();
        let mut guard = self.lock()?;
        match guard.get(key) {
            Some(slot) if slot.is_expired(now) => {
                guard.remove(key);
                Ok(None)
            }
            Some(slot) => Ok(Some(slot.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), AdapterError> {
        let slot = CacheSlot {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.lock()?.insert(key.to_string(), slot);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), AdapterError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn has(&self, key: &str) -> Result<bool, AdapterError> {
        Ok(self.get(key)?.is_some())
    }

    fn clear(&self) -> Result<(), AdapterError> {
        self.lock()?.clear();
        Ok(())
    }
}
