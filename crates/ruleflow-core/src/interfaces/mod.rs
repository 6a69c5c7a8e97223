// crates/ruleflow-core/src/interfaces/mod.rs
// ============================================================================
// Module: Ruleflow Adapter Interfaces
// Description: Backend-agnostic interfaces for caching, audit, notification, and data sourcing.
// Purpose: Define the contract surfaces consumed by the engine orchestrator.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! Adapters integrate the engine with external systems without embedding
//! backend-specific details. Adapter failures are isolated by the
//! orchestrator: cache read failures degrade to misses and every other
//! failure is swallowed, so implementations may fail freely without
//! affecting evaluation results. Thread safety across concurrent executions
//! is the adapter's responsibility.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::ExecutionResult;
use crate::core::RuleId;
use crate::core::RuleSet;
use crate::core::RuleSetId;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Adapter Errors
// ============================================================================

/// Errors surfaced by adapter implementations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Backend operation failed.
    #[error("adapter backend error: {0}")]
    Backend(String),
    /// Payload could not be serialized or deserialized.
    #[error("adapter serialization error: {0}")]
    Serialization(String),
    /// Adapter is not ready or has been torn down.
    #[error("adapter unavailable: {0}")]
    Unavailable(String),
}

/// Adapter kinds accepted by the engine.
///
/// # Invariants
/// - Variants are stable for diagnostics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// External fact hydration.
    DataSource,
    /// Execution audit trail.
    Audit,
    /// Rule-set and result caching.
    Cache,
    /// Execution event notification.
    Notification,
}

impl AdapterKind {
    /// Returns a stable label for diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DataSource => "data_source",
            Self::Audit => "audit",
            Self::Cache => "cache",
            Self::Notification => "notification",
        }
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Cache Adapter
// ============================================================================

/// Key-value cache consumed for rule-set hydration and result memoization.
///
/// Values are JSON; the engine owns serialization of the payloads it caches.
pub trait CacheAdapter: Send + Sync {
    /// Prepares the adapter for use. Called once during engine `init`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation fails.
    fn init(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Tears the adapter down. Called once during engine `shutdown`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when teardown fails.
    fn destroy(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Returns the cached value for a key, if present and unexpired.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend read fails.
    fn get(&self, key: &str) -> Result<Option<Value>, AdapterError>;

    /// Stores a value under a key with an optional time-to-live.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend write fails.
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<(), AdapterError>;

    /// Removes a key.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend write fails.
    fn delete(&self, key: &str) -> Result<(), AdapterError>;

    /// Returns true when the key is present and unexpired.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend read fails.
    fn has(&self, key: &str) -> Result<bool, AdapterError>;

    /// Removes every key.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend write fails.
    fn clear(&self) -> Result<(), AdapterError>;
}

// ============================================================================
// SECTION: Audit Adapter
// ============================================================================

/// Audit entry recorded after every execution.
///
/// # Invariants
/// - `result` is the full execution result as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Record timestamp supplied by the engine.
    pub timestamp: Timestamp,
    /// Executed rule set identifier.
    pub rule_set_id: RuleSetId,
    /// Executed rule set name.
    pub rule_set_name: String,
    /// Full execution result.
    pub result: ExecutionResult,
    /// Engine metadata configured by the host.
    pub metadata: Value,
}

/// Filter for querying recorded audit entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Restrict to one rule set.
    pub rule_set_id: Option<RuleSetId>,
    /// Restrict by execution success.
    pub success: Option<bool>,
    /// Restrict to entries recorded at or after this time.
    pub since: Option<Timestamp>,
    /// Maximum entries to return, newest first.
    pub limit: Option<usize>,
}

/// Execution audit trail.
pub trait AuditAdapter: Send + Sync {
    /// Prepares the adapter for use. Called once during engine `init`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation fails.
    fn init(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Tears the adapter down. Called once during engine `shutdown`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when teardown fails.
    fn destroy(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Records one audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend write fails.
    fn record(&self, entry: AuditEntry) -> Result<(), AdapterError>;

    /// Queries recorded entries. Optional; the default returns nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the backend read fails.
    fn query(&self, filter: &AuditQuery) -> Result<Vec<AuditEntry>, AdapterError> {
        let _ = filter;
        Ok(Vec::new())
    }
}

// ============================================================================
// SECTION: Notification Adapter
// ============================================================================

/// Severity of a notification event.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSeverity {
    /// A successful execution fired at least one rule.
    Info,
    /// Evaluation failed.
    Error,
}

/// Event emitted by the engine after an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Event severity.
    pub severity: NotificationSeverity,
    /// Executed rule set identifier.
    pub rule_set_id: RuleSetId,
    /// Human-readable event message.
    pub message: String,
    /// Identifiers of fired rules, in firing order.
    pub rules_fired: Vec<RuleId>,
    /// Event timestamp supplied by the engine.
    pub timestamp: Timestamp,
}

/// Execution event sink.
pub trait NotificationAdapter: Send + Sync {
    /// Prepares the adapter for use. Called once during engine `init`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation fails.
    fn init(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Tears the adapter down. Called once during engine `shutdown`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when teardown fails.
    fn destroy(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when delivery fails.
    fn notify(&self, event: NotificationEvent) -> Result<(), AdapterError>;
}

// ============================================================================
// SECTION: Data Source Adapter
// ============================================================================

/// External fact hydration consumed by upstream callers to assemble inputs.
///
/// The evaluator never calls this adapter; hosts may use it to build the
/// input fact object before `execute`.
pub trait DataSourceAdapter: Send + Sync {
    /// Prepares the adapter for use. Called once during engine `init`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when preparation fails.
    fn init(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Tears the adapter down. Called once during engine `shutdown`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when teardown fails.
    fn destroy(&self) -> Result<(), AdapterError> {
        Ok(())
    }

    /// Fetches external facts for the given context and options.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the fetch fails.
    fn fetch_data(&self, context: &Value, options: &Value) -> Result<Value, AdapterError>;
}

// ============================================================================
// SECTION: Rule Set Fetcher
// ============================================================================

/// Supplier of rule sets by identifier, backing `load_rule_set` cache misses.
///
/// This is the engine's only view of the persistence layer.
pub trait RuleSetFetcher {
    /// Returns the rule set for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the rule set cannot be supplied.
    fn fetch(&self, id: &RuleSetId) -> Result<RuleSet, AdapterError>;
}
