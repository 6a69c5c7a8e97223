// crates/ruleflow-core/src/runtime/path.rs
// ============================================================================
// Module: Ruleflow Path Resolver
// Description: Dot-notation read and write access over JSON values.
// Purpose: Resolve condition fields and apply action targets without failing.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Paths are literal strings split on `.` with no escaping. Resolution is
//! total: absent or null intermediates yield `None` instead of failing.
//! Writes create intermediate objects as needed and overwrite non-object
//! intermediates with a fresh object, the consistent choice documented at
//! the crate surface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a dot path against a JSON value.
///
/// Returns `None` when any intermediate component is absent, null, or not an
/// object. A terminal `null` is present and resolves to `Some(&Value::Null)`.
#[must_use]
pub fn resolve<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = obj;
    let mut components = path.split('.').peekable();

    while let Some(component) = components.next() {
        let Value::Object(map) = current else {
            return None;
        };
        let value = map.get(component)?;
        if components.peek().is_none() {
            return Some(value);
        }
        if value.is_null() {
            return None;
        }
        current = value;
    }

    None
}

// ============================================================================
// SECTION: Mutation
// ============================================================================

/// Writes a value at a dot path, creating intermediate objects as needed.
///
/// Non-object intermediates (including the root) are overwritten with a
/// fresh object before descending.
pub fn set(obj: &mut Value, path: &str, value: Value) {
    let mut current = obj;
    let mut components = path.split('.').peekable();

    while let Some(component) = components.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };

        if components.peek().is_none() {
            map.insert(component.to_string(), value);
            return;
        }

        let entry = map.entry(component.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry;
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
