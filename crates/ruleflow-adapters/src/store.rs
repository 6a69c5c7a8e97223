// crates/ruleflow-adapters/src/store.rs
// ============================================================================
// Module: In-Memory Rule Set Store
// Description: Simple in-memory rule set supplier for tests and examples.
// Purpose: Provide a deterministic fetcher implementation without external deps.
// Dependencies: ruleflow-core, std
// ============================================================================

//! ## Overview
//! Holds rule sets in process memory and serves them through the
//! [`RuleSetFetcher`] interface, standing in for a persistence layer.
//! Not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use ruleflow_core::core::RuleSet;
use ruleflow_core::core::RuleSetId;
use ruleflow_core::interfaces::AdapterError;
use ruleflow_core::interfaces::RuleSetFetcher;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory rule set store usable as a fetcher.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRuleSetStore {
    /// Rule sets keyed by identifier, protected by a mutex.
    rule_sets: Arc<Mutex<BTreeMap<String, RuleSet>>>,
}

impl InMemoryRuleSetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rule_sets: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Inserts or replaces a rule set.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the mutex is poisoned.
    pub fn insert(&self, rule_set: RuleSet) -> Result<(), AdapterError> {
        self.rule_sets
            .lock()
            .map_err(|_| AdapterError::Backend("rule set store mutex poisoned".to_string()))?
            .insert(rule_set.id.to_string(), rule_set);
        Ok(())
    }
}

impl RuleSetFetcher for InMemoryRuleSetStore {
    fn fetch(&self, id: &RuleSetId) -> Result<RuleSet, AdapterError> {
        let guard = self
            .rule_sets
            .lock()
            .map_err(|_| AdapterError::Backend("rule set store mutex poisoned".to_string()))?;
        guard
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| AdapterError::Backend(format!("rule set not found: {id}")))
    }
}
