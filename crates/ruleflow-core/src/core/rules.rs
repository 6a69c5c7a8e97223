// crates/ruleflow-core/src/core/rules.rs
// ============================================================================
// Module: Ruleflow Rule Model
// Description: Rules, conditions, actions, and the rule set container.
// Purpose: Define the declarative inputs consumed by the evaluator.
// Dependencies: cond-logic, crate::core::{identifiers, tables}, serde
// ============================================================================

//! ## Overview
//! A rule couples a condition group with an ordered action list and a firing
//! priority. Rule sets bundle prioritized rules with decision tables and are
//! immutable inputs to one execution. These are pure values; evaluation lives
//! in the runtime.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cond_logic::ConditionGroup;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::RuleId;
use crate::core::identifiers::RuleSetId;
use crate::core::tables::DecisionTable;

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Leaf comparison between a dot-path field and a literal value.
///
/// # Invariants
/// - `operator` names a built-in or plugin operator; unknown names evaluate
///   to FALSE rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot-notation path resolved against the input fact object.
    pub field: String,
    /// Operator name dispatched plugin-first, then built-in.
    pub operator: String,
    /// Literal compare value; its shape is operator-dependent.
    #[serde(default)]
    pub value: Value,
}

/// Condition tree with [`Condition`] leaves.
pub type RuleConditions = ConditionGroup<Condition>;

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Discriminator for an action applied to the output object.
///
/// # Invariants
/// - The five built-in kinds serialize as stable uppercase tags; any other
///   string deserializes as an extension kind resolved via the plugin registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Overwrite the path with the action value.
    #[serde(rename = "SET")]
    Set,
    /// Push the value onto a sequence at the path, creating it when absent.
    #[serde(rename = "APPEND")]
    Append,
    /// Numerically add the value to the path (absent treated as zero).
    #[serde(rename = "INCREMENT")]
    Increment,
    /// Numerically subtract the value from the path (absent treated as zero).
    #[serde(rename = "DECREMENT")]
    Decrement,
    /// Plugin-dispatched action that falls back to SET without a handler.
    #[serde(rename = "CUSTOM")]
    Custom,
    /// Plugin-defined action kind; ignored when no handler is registered.
    #[serde(untagged)]
    Extension(String),
}

impl ActionKind {
    /// Returns the stable name used for plugin handler lookup.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Set => "SET",
            Self::Append => "APPEND",
            Self::Increment => "INCREMENT",
            Self::Decrement => "DECREMENT",
            Self::Custom => "CUSTOM",
            Self::Extension(name) => name,
        }
    }
}

/// One mutation of the output object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action discriminator.
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Dot-notation path written in the output object.
    pub field: String,
    /// Action value; its interpretation is kind-dependent.
    #[serde(default)]
    pub value: Value,
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// A prioritized, gated bundle of actions.
///
/// # Invariants
/// - `id` is stable across executions.
/// - Rules with equal priority keep their declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule identifier.
    pub id: RuleId,
    /// Human-readable rule name.
    pub name: String,
    /// Firing priority; higher priorities evaluate earlier.
    #[serde(default)]
    pub priority: i64,
    /// Disabled rules never fire.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Condition tree gating the rule; an empty group always fires.
    #[serde(default)]
    pub conditions: RuleConditions,
    /// Actions applied in declaration order when the rule fires.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Serde default for the `enabled` flag.
const fn default_enabled() -> bool {
    true
}

// ============================================================================
// SECTION: Rule Sets
// ============================================================================

/// The unit of evaluation: prioritized rules plus decision tables.
///
/// # Invariants
/// - Rule ids and table ids are unique within the set (see [`RuleSet::validate`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule set identifier.
    pub id: RuleSetId,
    /// Human-readable rule set name.
    pub name: String,
    /// Rules evaluated in stable descending-priority order.
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Decision tables evaluated in declaration order after the rules.
    #[serde(default)]
    pub decision_tables: Vec<DecisionTable>,
}

/// Structural validation errors for a rule set.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    /// Two rules share an identifier.
    #[error("duplicate rule id: {0}")]
    DuplicateRuleId(String),
    /// Two decision tables share an identifier.
    #[error("duplicate decision table id: {0}")]
    DuplicateTableId(String),
    /// A row cell references a column id the table does not declare.
    #[error("table {table} row {row} references unknown column {column}")]
    UnknownColumn {
        /// Table containing the offending row.
        table: String,
        /// Row holding the unknown cell key.
        row: String,
        /// Column id that is not declared by the table.
        column: String,
    },
}

impl RuleSet {
    /// Validates structural invariants: unique rule/table ids and known
    /// row cell columns.
    ///
    /// Operator/value compatibility is deliberately not checked; the
    /// evaluator is total over malformed conditions.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleSetError`] encountered in declaration order.
    pub fn validate(&self) -> Result<(), RuleSetError> {
        let mut rule_ids = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if rule_ids.contains(&rule.id.as_str()) {
                return Err(RuleSetError::DuplicateRuleId(rule.id.to_string()));
            }
            rule_ids.push(rule.id.as_str());
        }

        let mut table_ids = Vec::with_capacity(self.decision_tables.len());
        for table in &self.decision_tables {
            if table_ids.contains(&table.id.as_str()) {
                return Err(RuleSetError::DuplicateTableId(table.id.to_string()));
            }
            table_ids.push(table.id.as_str());

            for row in &table.rows {
                for column_id in row.values.keys() {
                    if !table.columns.iter().any(|column| &column.id == column_id) {
                        return Err(RuleSetError::UnknownColumn {
                            table: table.id.to_string(),
                            row: row.id.to_string(),
                            column: column_id.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
