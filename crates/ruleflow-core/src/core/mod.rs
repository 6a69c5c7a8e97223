// crates/ruleflow-core/src/core/mod.rs
// ============================================================================
// Module: Ruleflow Core Types
// Description: Canonical rule, table, result, and fingerprint structures.
// Purpose: Provide stable, serializable types for rule sets and execution traces.
// Dependencies: cond-logic, serde
// ============================================================================

//! ## Overview
//! Ruleflow core types define rule sets, decision tables, execution results,
//! and fingerprinting. These types are the canonical source of truth for any
//! derived API surfaces; they carry no evaluation behavior.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod fingerprint;
pub mod identifiers;
pub mod results;
pub mod rules;
pub mod tables;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fingerprint::FINGERPRINT_HEX_LEN;
pub use fingerprint::FingerprintError;
pub use fingerprint::canonical_json_bytes;
pub use fingerprint::input_fingerprint;
pub use fingerprint::result_cache_key;
pub use fingerprint::rule_set_cache_key;
pub use identifiers::ColumnId;
pub use identifiers::RowId;
pub use identifiers::RuleId;
pub use identifiers::RuleSetId;
pub use identifiers::TableId;
pub use results::DecisionTableResult;
pub use results::ExecutionResult;
pub use results::RuleResult;
pub use rules::Action;
pub use rules::ActionKind;
pub use rules::Condition;
pub use rules::Rule;
pub use rules::RuleConditions;
pub use rules::RuleSet;
pub use rules::RuleSetError;
pub use tables::Column;
pub use tables::ColumnKind;
pub use tables::DecisionTable;
pub use tables::HitPolicy;
pub use tables::Row;
pub use time::Timestamp;
