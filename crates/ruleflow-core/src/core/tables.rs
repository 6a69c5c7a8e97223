// crates/ruleflow-core/src/core/tables.rs
// ============================================================================
// Module: Ruleflow Decision Tables
// Description: Decision table, column, row, and hit policy definitions.
// Purpose: Define the tabular rule form matched row-by-row by the evaluator.
// Dependencies: crate::core::{identifiers, rules}, serde
// ============================================================================

//! ## Overview
//! A decision table is an ordered grid: condition columns gate each row and
//! action columns emit output mutations for matched rows. Cells live in a map
//! keyed by column id; absent, null, empty-string, and literal `"*"` cells
//! are wildcards in condition columns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ColumnId;
use crate::core::identifiers::RowId;
use crate::core::identifiers::TableId;
use crate::core::rules::ActionKind;

// ============================================================================
// SECTION: Hit Policy
// ============================================================================

/// Controls how many matched rows contribute actions.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HitPolicy {
    /// Stop after the first matched row.
    First,
    /// Visit every enabled row; actions concatenate in row order.
    All,
    /// Same action semantics as `All`; reserved for future aggregation.
    Collect,
}

// ============================================================================
// SECTION: Columns
// ============================================================================

/// Column role within a decision table.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Cells gate the row against the input field.
    Condition,
    /// Cells become output actions when the row matches.
    Action,
}

/// One decision table column.
///
/// # Invariants
/// - Condition columns may omit `operator` (defaults to `equals`).
/// - Action columns may omit `action_type` (defaults to SET).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column identifier, the key used by row cells.
    pub id: ColumnId,
    /// Dot-notation field read (condition) or written (action).
    pub field: String,
    /// Column role.
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Operator for condition cells; `None` means `equals`.
    #[serde(default)]
    pub operator: Option<String>,
    /// Action kind for action cells; `None` means SET.
    #[serde(default)]
    pub action_type: Option<ActionKind>,
}

// ============================================================================
// SECTION: Rows
// ============================================================================

/// One decision table row.
///
/// # Invariants
/// - `values` keys are column ids declared by the owning table.
/// - Disabled rows never match under any hit policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Row identifier.
    pub id: RowId,
    /// Cell values keyed by column id; missing keys are wildcards.
    #[serde(default)]
    pub values: BTreeMap<ColumnId, Value>,
    /// Disabled rows are skipped entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Serde default for the `enabled` flag.
const fn default_enabled() -> bool {
    true
}

impl Row {
    /// Returns the cell for a column, if present.
    #[must_use]
    pub fn cell(&self, column_id: &ColumnId) -> Option<&Value> {
        self.values.get(column_id)
    }
}

// ============================================================================
// SECTION: Decision Tables
// ============================================================================

/// A decision table: ordered columns, ordered rows, and a hit policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTable {
    /// Table identifier.
    pub id: TableId,
    /// Human-readable table name.
    pub name: String,
    /// Ordered columns; order fixes action emission order within a row.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Ordered rows; order fixes matching and concatenation order.
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Hit policy applied during matching.
    pub hit_policy: HitPolicy,
}
