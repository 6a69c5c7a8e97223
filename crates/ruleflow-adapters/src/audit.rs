// crates/ruleflow-adapters/src/audit.rs
// ============================================================================
// Module: In-Memory Audit Adapter
// Description: Append-only audit trail backed by a mutex-guarded vector.
// Purpose: Provide a queryable audit implementation without external deps.
// Dependencies: ruleflow-core, std
// ============================================================================

//! ## Overview
//! Records every audit entry in process memory and supports filtered
//! queries, newest first. Not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use ruleflow_core::interfaces::AdapterError;
use ruleflow_core::interfaces::AuditAdapter;
use ruleflow_core::interfaces::AuditEntry;
use ruleflow_core::interfaces::AuditQuery;

// ============================================================================
// SECTION: In-Memory Audit Trail
// ============================================================================

/// In-memory audit trail for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditAdapter {
    /// Recorded entries, oldest first, protected by a mutex.
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditAdapter {
    /// Creates an empty audit trail.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the number of recorded entries.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the mutex is poisoned.
    pub fn len(&self) -> Result<usize, AdapterError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when no entries are recorded.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, AdapterError> {
        Ok(self.len()? == 0)
    }

    /// Locks the entry vector.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<AuditEntry>>, AdapterError> {
        self.entries.lock().map_err(|_| AdapterError::Backend("audit mutex poisoned".to_string()))
    }
}

impl AuditAdapter for MemoryAuditAdapter {
    fn record(&self, entry: AuditEntry) -> Result<(), AdapterError> {
        self.lock()?.push(entry);
        Ok(())
    }

    fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditEntry>, AdapterError> {
        let guard = self.lock()?;
        let mut matched: Vec<AuditEntry> = guard
            .iter()
            .rev()
            .filter(|entry| {
                filter
                    .rule_set_id
                    .as_ref()
                    .is_none_or(|rule_set_id| &entry.rule_set_id == rule_set_id)
            })
            .filter(|entry| filter.success.is_none_or(|success| entry.result.success == success))
            .filter(|entry| filter.since.is_none_or(|since| entry.timestamp >= since))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}
