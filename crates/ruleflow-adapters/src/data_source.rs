// crates/ruleflow-adapters/src/data_source.rs
// ============================================================================
// Module: Static Data Source Adapter
// Description: Fact hydration from a fixed JSON document.
// Purpose: Provide a deterministic data source for tests and demos.
// Dependencies: ruleflow-core, serde_json
// ============================================================================

//! ## Overview
//! Serves facts from a fixed JSON document. When `options` carries a `path`
//! string, the value at that dot path is returned (null when absent);
//! otherwise the whole document is returned. The request context is ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ruleflow_core::interfaces::AdapterError;
use ruleflow_core::interfaces::DataSourceAdapter;
use ruleflow_core::runtime::path;
use serde_json::Value;

// ============================================================================
// SECTION: Static Data Source
// ============================================================================

/// Data source adapter backed by a fixed JSON document.
#[derive(Debug, Clone)]
pub struct StaticDataSourceAdapter {
    /// Document served to callers.
    facts: Value,
}

impl StaticDataSourceAdapter {
    /// Creates a data source over the given document.
    #[must_use]
    pub const fn new(facts: Value) -> Self {
        Self {
            facts,
        }
    }
}

impl DataSourceAdapter for StaticDataSourceAdapter {
    fn fetch_data(&self, _context: &Value, options: &Value) -> Result<Value, AdapterError> {
        match options.get("path").and_then(Value::as_str) {
            Some(selector) => {
                Ok(path::resolve(&self.facts, selector).cloned().unwrap_or(Value::Null))
            }
            None => Ok(self.facts.clone()),
        }
    }
}
