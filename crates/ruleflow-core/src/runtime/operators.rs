// crates/ruleflow-core/src/runtime/operators.rs
// ============================================================================
// Module: Ruleflow Operator Kernel
// Description: Built-in comparison operators over JSON field values.
// Purpose: Convert field/compare value pairs into deterministic booleans.
// Dependencies: bigdecimal, regex, serde_json
// ============================================================================

//! ## Overview
//! The operator kernel is total: every built-in operator returns a boolean
//! for any pair of JSON values, and the dispatch entry point reports unknown
//! operator names instead of failing. Numeric coercion is decimal-aware and
//! deterministic; values that do not coerce behave like NaN and compare as
//! FALSE. Absent fields are FALSE everywhere except the explicit null checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use regex::Regex;
use serde_json::Value;

// ============================================================================
// SECTION: Operator Names
// ============================================================================

/// Names of the built-in operators, in documentation order.
pub const BUILTIN_OPERATOR_NAMES: &[&str] = &[
    "equals",
    "notEquals",
    "greaterThan",
    "greaterThanOrEqual",
    "lessThan",
    "lessThanOrEqual",
    "contains",
    "notContains",
    "startsWith",
    "endsWith",
    "in",
    "notIn",
    "between",
    "isNull",
    "isNotNull",
    "matches",
];

/// Returns true when the name belongs to the built-in alphabet.
#[must_use]
pub fn is_builtin_operator(name: &str) -> bool {
    BUILTIN_OPERATOR_NAMES.contains(&name)
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Evaluates a built-in operator against a resolved field value.
///
/// Returns `None` for unknown operator names so callers can fall back to
/// plugin dispatch or FALSE.
#[must_use]
pub fn evaluate(name: &str, field: Option<&Value>, compare: &Value) -> Option<bool> {
    let outcome = match name {
        "equals" => field.is_some_and(|value| strict_equals(value, compare)),
        "notEquals" => field.is_some_and(|value| !strict_equals(value, compare)),
        "greaterThan" | "greaterThanOrEqual" | "lessThan" | "lessThanOrEqual" => {
            field.is_some_and(|value| compare_ordering(name, value, compare))
        }
        "contains" => field.is_some_and(|value| contains(value, compare)),
        "notContains" => field.is_some_and(|value| !contains(value, compare)),
        "startsWith" => field.is_some_and(|value| starts_with(value, compare)),
        "endsWith" => field.is_some_and(|value| ends_with(value, compare)),
        "in" => field.is_some_and(|value| in_set(value, compare)),
        "notIn" => field.is_some_and(|value| !in_set(value, compare)),
        "between" => field.is_some_and(|value| between(value, compare)),
        "isNull" => is_null(field),
        "isNotNull" => !is_null(field),
        "matches" => field.is_some_and(|value| matches_pattern(value, compare)),
        _ => return None,
    };
    Some(outcome)
}

// ============================================================================
// SECTION: Equality
// ============================================================================

/// Strict identity with decimal-aware numeric handling.
///
/// Numbers compare by numeric value (`1 == 1.0`); every other pairing uses
/// structural equality with no cross-type coercion (`"1" != 1`).
fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left_num), Value::Number(right_num)) => {
            match (decimal_from_str(&left_num.to_string()), decimal_from_str(&right_num.to_string()))
            {
                (Some(left_dec), Some(right_dec)) => left_dec == right_dec,
                _ => false,
            }
        }
        _ => left == right,
    }
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

/// Evaluates an ordering operator after numeric coercion of both sides.
fn compare_ordering(name: &str, left: &Value, right: &Value) -> bool {
    let Some(ordering) = decimal_cmp(left, right) else {
        return false;
    };
    match name {
        "greaterThan" => ordering.is_gt(),
        "greaterThanOrEqual" => ordering.is_ge(),
        "lessThan" => ordering.is_lt(),
        "lessThanOrEqual" => ordering.is_le(),
        _ => false,
    }
}

/// Orders two JSON values after decimal coercion.
fn decimal_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    let left = coerce_decimal(left)?;
    let right = coerce_decimal(right)?;
    Some(left.cmp(&right))
}

// ============================================================================
// SECTION: Containment
// ============================================================================

/// Containment semantics: substring for string fields, element membership
/// for sequence fields, FALSE otherwise.
fn contains(field: &Value, compare: &Value) -> bool {
    match field {
        Value::String(haystack) => haystack.contains(&coerce_string(compare)),
        Value::Array(items) => items.iter().any(|item| strict_equals(item, compare)),
        _ => false,
    }
}

/// String prefix check; non-string fields are FALSE.
fn starts_with(field: &Value, compare: &Value) -> bool {
    match field {
        Value::String(value) => value.starts_with(&coerce_string(compare)),
        _ => false,
    }
}

/// String suffix check; non-string fields are FALSE.
fn ends_with(field: &Value, compare: &Value) -> bool {
    match field {
        Value::String(value) => value.ends_with(&coerce_string(compare)),
        _ => false,
    }
}

/// Membership of the field in a compare sequence.
fn in_set(field: &Value, compare: &Value) -> bool {
    match compare {
        Value::Array(items) => items.iter().any(|item| strict_equals(field, item)),
        _ => false,
    }
}

// ============================================================================
// SECTION: Ranges
// ============================================================================

/// Inclusive range check over a `[lo, hi]` compare pair.
fn between(field: &Value, compare: &Value) -> bool {
    let Value::Array(bounds) = compare else {
        return false;
    };
    let [lo, hi] = bounds.as_slice() else {
        return false;
    };
    let (Some(value), Some(lo), Some(hi)) =
        (coerce_decimal(field), coerce_decimal(lo), coerce_decimal(hi))
    else {
        return false;
    };
    lo <= value && value <= hi
}

// ============================================================================
// SECTION: Null Checks
// ============================================================================

/// TRUE when the field is absent or null.
fn is_null(field: Option<&Value>) -> bool {
    field.is_none_or(Value::is_null)
}

// ============================================================================
// SECTION: Pattern Matching
// ============================================================================

/// Regular-expression match; invalid patterns are FALSE, never an error.
///
/// Patterns are unanchored unless the pattern anchors itself.
fn matches_pattern(field: &Value, compare: &Value) -> bool {
    let text = coerce_string(field);
    let pattern = coerce_string(compare);
    Regex::new(&pattern).map(|regex| regex.is_match(&text)).unwrap_or(false)
}

// ============================================================================
// SECTION: Coercion Helpers
// ============================================================================

/// Coerces a JSON value to a decimal, NaN-like failures yielding `None`.
///
/// Numbers coerce through their stable string form, numeric strings parse
/// after trimming, and booleans map to zero and one.
pub(crate) fn coerce_decimal(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(number) => decimal_from_str(&number.to_string()),
        Value::String(text) => decimal_from_str(text.trim()),
        Value::Bool(flag) => Some(BigDecimal::from(u8::from(*flag))),
        _ => None,
    }
}

/// Parses a decimal from a stable string representation.
fn decimal_from_str(text: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(text).ok()
}

/// Coerces a JSON value to its string form for substring and regex checks.
///
/// Strings pass through; scalars render via `Display`; sequences and maps
/// render as compact JSON.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

/// Renders a decimal back into a JSON number.
///
/// Integer-valued results that fit `i64` stay integers; everything else
/// renders as a finite float. Non-finite conversions yield `None` and the
/// caller leaves the output untouched.
pub(crate) fn decimal_to_value(value: &BigDecimal) -> Option<Value> {
    use bigdecimal::ToPrimitive;

    if value.is_integer()
        && let Some(int) = value.to_i64()
    {
        return Some(Value::from(int));
    }
    value.to_f64().and_then(serde_json::Number::from_f64).map(Value::Number)
}
