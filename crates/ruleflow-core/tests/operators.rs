// crates/ruleflow-core/tests/operators.rs
// ============================================================================
// Module: Operator Kernel Tests
// Description: Validate built-in operator semantics and coercion rules.
// Purpose: Ensure deterministic, total operator evaluation over JSON values.
// Dependencies: ruleflow-core, serde_json
// ============================================================================

//! Behavior tests for the built-in operator kernel.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]

use ruleflow_core::runtime::operators::BUILTIN_OPERATOR_NAMES;
use ruleflow_core::runtime::operators::evaluate;
use ruleflow_core::runtime::operators::is_builtin_operator;
use serde_json::Value;
use serde_json::json;

fn eval(name: &str, field: &Value, compare: &Value) -> bool {
    evaluate(name, Some(field), compare).unwrap()
}

fn eval_absent(name: &str, compare: &Value) -> bool {
    evaluate(name, None, compare).unwrap()
}

#[test]
fn equals_is_strict_identity_except_numbers() {
    assert!(eval("equals", &json!("gold"), &json!("gold")));
    assert!(!eval("equals", &json!("gold"), &json!("silver")));

    // Numbers compare by numeric value, not representation.
    assert!(eval("equals", &json!(1), &json!(1.0)));
    assert!(eval("equals", &json!(10), &json!(10)));

    // No cross-type coercion.
    assert!(!eval("equals", &json!("1"), &json!(1)));
    assert!(!eval("equals", &json!(true), &json!(1)));
    assert!(!eval("equals", &json!(null), &json!(0)));
    assert!(eval("equals", &json!(null), &json!(null)));
}

#[test]
fn not_equals_negates_identity_for_present_fields() {
    assert!(eval("notEquals", &json!("gold"), &json!("silver")));
    assert!(!eval("notEquals", &json!(1), &json!(1.0)));
    assert!(!eval_absent("notEquals", &json!("anything")));
}

#[test]
fn ordering_operators_coerce_to_numbers() {
    assert!(eval("greaterThan", &json!(5), &json!(3)));
    assert!(!eval("greaterThan", &json!(3), &json!(3)));
    assert!(eval("greaterThanOrEqual", &json!(3), &json!(3)));
    assert!(eval("lessThan", &json!(2), &json!(3)));
    assert!(eval("lessThanOrEqual", &json!(3), &json!(3)));

    // Numeric strings participate after coercion.
    assert!(eval("greaterThan", &json!("10"), &json!(9)));
    assert!(eval("lessThan", &json!(9), &json!("10")));
}

#[test]
fn ordering_on_non_numeric_values_is_false() {
    assert!(!eval("greaterThan", &json!("abc"), &json!(1)));
    assert!(!eval("lessThan", &json!(1), &json!("abc")));
    assert!(!eval("greaterThanOrEqual", &json!({"a": 1}), &json!(1)));
    assert!(!eval("lessThanOrEqual", &json!([1]), &json!(2)));
}

#[test]
fn contains_on_strings_is_substring() {
    assert!(eval("contains", &json!("hello world"), &json!("lo wo")));
    assert!(!eval("contains", &json!("hello"), &json!("xyz")));

    // Non-string compare values are stringified.
    assert!(eval("contains", &json!("build 42 ok"), &json!(42)));
}

#[test]
fn contains_on_arrays_is_membership() {
    assert!(eval("contains", &json!([1, 2, 3]), &json!(2)));
    assert!(!eval("contains", &json!([1, 2, 3]), &json!(9)));
    assert!(eval("contains", &json!(["a", "b"]), &json!("a")));
}

#[test]
fn contains_on_other_shapes_is_false_and_not_contains_true() {
    assert!(!eval("contains", &json!(42), &json!(4)));
    assert!(eval("notContains", &json!(42), &json!(4)));
    assert!(eval("notContains", &json!([1, 2, 3]), &json!(9)));
    assert!(!eval("notContains", &json!([1, 2, 3]), &json!(2)));
}

#[test]
fn starts_and_ends_with_require_string_fields() {
    assert!(eval("startsWith", &json!("ruleflow"), &json!("rule")));
    assert!(!eval("startsWith", &json!("ruleflow"), &json!("flow")));
    assert!(eval("endsWith", &json!("ruleflow"), &json!("flow")));
    assert!(!eval("endsWith", &json!(42), &json!("2")));
    assert!(!eval("startsWith", &json!(["rule"]), &json!("rule")));
}

#[test]
fn in_requires_a_sequence_compare() {
    assert!(eval("in", &json!("gold"), &json!(["gold", "silver"])));
    assert!(!eval("in", &json!("bronze"), &json!(["gold", "silver"])));
    assert!(!eval("in", &json!("gold"), &json!("gold")));

    assert!(eval("notIn", &json!("bronze"), &json!(["gold", "silver"])));
    assert!(!eval("notIn", &json!("gold"), &json!(["gold", "silver"])));
    assert!(eval("notIn", &json!("gold"), &json!("gold")));
}

#[test]
fn between_bounds_are_inclusive() {
    assert!(eval("between", &json!(1), &json!([1, 10])));
    assert!(eval("between", &json!(10), &json!([1, 10])));
    assert!(!eval("between", &json!(0), &json!([1, 10])));
    assert!(!eval("between", &json!(11), &json!([1, 10])));
    assert!(eval("between", &json!(5.5), &json!([1, 10])));
}

#[test]
fn between_rejects_malformed_ranges() {
    assert!(!eval("between", &json!(5), &json!([1])));
    assert!(!eval("between", &json!(5), &json!([1, 2, 3])));
    assert!(!eval("between", &json!(5), &json!("1..10")));
    assert!(!eval("between", &json!("abc"), &json!([1, 10])));
}

#[test]
fn null_checks_cover_absent_and_null() {
    assert!(eval_absent("isNull", &json!(null)));
    assert!(eval("isNull", &json!(null), &json!(null)));
    assert!(!eval("isNull", &json!(0), &json!(null)));

    assert!(eval("isNotNull", &json!(0), &json!(null)));
    assert!(!eval("isNotNull", &json!(null), &json!(null)));
    assert!(!eval_absent("isNotNull", &json!(null)));
}

#[test]
fn matches_compiles_compare_as_regex() {
    assert!(eval("matches", &json!("user-1234"), &json!(r"^user-\d+$")));
    assert!(!eval("matches", &json!("user-abc"), &json!(r"^user-\d+$")));

    // Unanchored by default.
    assert!(eval("matches", &json!("the quick fox"), &json!("quick")));
}

#[test]
fn matches_with_invalid_regex_is_false() {
    assert!(!eval("matches", &json!("anything"), &json!("([unclosed")));
    assert!(!eval("matches", &json!("anything"), &json!("*dangling")));
}

#[test]
fn absent_fields_are_false_outside_null_checks() {
    for name in BUILTIN_OPERATOR_NAMES {
        if *name == "isNull" {
            continue;
        }
        assert!(
            !eval_absent(name, &json!([1, 10])),
            "operator {name} should be false for absent fields"
        );
    }
}

#[test]
fn unknown_operators_report_none() {
    assert_eq!(evaluate("withinRadius", Some(&json!(1)), &json!(2)), None);
    assert_eq!(evaluate("", None, &json!(null)), None);
}

#[test]
fn builtin_alphabet_is_closed_and_queryable() {
    for name in BUILTIN_OPERATOR_NAMES {
        assert!(is_builtin_operator(name));
        assert!(evaluate(name, Some(&json!(1)), &json!(1)).is_some());
    }
    assert!(!is_builtin_operator("withinRadius"));
}
