// crates/ruleflow-core/src/core/results.rs
// ============================================================================
// Module: Ruleflow Execution Results
// Description: Per-rule traces, per-table traces, and the execution result.
// Purpose: Capture deterministic evaluation outcomes for callers and auditing.
// Dependencies: crate::core::{identifiers, rules}, serde
// ============================================================================

//! ## Overview
//! Every execution returns an [`ExecutionResult`] value, success or not.
//! Failures carry a message with an empty output and empty traces; execution
//! time is always reported.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::RowId;
use crate::core::identifiers::RuleId;
use crate::core::identifiers::TableId;
use crate::core::rules::Action;

// ============================================================================
// SECTION: Rule Results
// ============================================================================

/// Firing trace for one rule.
///
/// # Invariants
/// - `actions` is empty when the rule did not fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Rule identifier.
    pub rule_id: RuleId,
    /// Rule name at evaluation time.
    pub rule_name: String,
    /// Whether the rule fired.
    pub fired: bool,
    /// Actions applied by the rule, in declaration order.
    pub actions: Vec<Action>,
}

impl RuleResult {
    /// Builds the trace for a rule that did not fire (or was skipped).
    #[must_use]
    pub const fn not_fired(rule_id: RuleId, rule_name: String) -> Self {
        Self {
            rule_id,
            rule_name,
            fired: false,
            actions: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Decision Table Results
// ============================================================================

/// Matching trace for one decision table.
///
/// # Invariants
/// - `matched_rows` preserves row declaration order.
/// - `actions` concatenates matched-row actions per the hit policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTableResult {
    /// Table identifier.
    pub table_id: TableId,
    /// Matched row identifiers in row order.
    pub matched_rows: Vec<RowId>,
    /// Actions emitted by matched rows.
    pub actions: Vec<Action>,
}

// ============================================================================
// SECTION: Execution Results
// ============================================================================

/// Aggregate result of executing a rule set against one input.
///
/// # Invariants
/// - `error` is populated iff `success` is false.
/// - On failure `output` is the empty object and all traces are empty.
/// - `execution_time_ms` is always reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether evaluation completed without failure.
    pub success: bool,
    /// Snapshot of the effective input.
    pub input: Value,
    /// Derived output object.
    pub output: Value,
    /// Per-rule firing traces in evaluation order.
    pub rule_results: Vec<RuleResult>,
    /// Per-table matching traces in declaration order.
    pub table_results: Vec<DecisionTableResult>,
    /// Identifiers of fired rules in firing order.
    pub rules_fired: Vec<RuleId>,
    /// Wall-clock execution time in milliseconds.
    pub execution_time_ms: u64,
    /// Failure message when `success` is false.
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Builds the canonical failure result: empty output, empty traces.
    #[must_use]
    pub fn failure(input: Value, message: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            success: false,
            input,
            output: Value::Object(Map::new()),
            rule_results: Vec::new(),
            table_results: Vec::new(),
            rules_fired: Vec::new(),
            execution_time_ms,
            error: Some(message.into()),
        }
    }
}
