// crates/cond-logic/tests/group.rs
// ============================================================================
// Module: Condition Group Tests
// Description: Validate group evaluation semantics and tree helpers.
// Purpose: Ensure AND/OR short-circuiting and empty-group behavior hold.
// Dependencies: cond-logic
// ============================================================================

//! Behavior tests for the condition group algebra.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::cell::Cell;

use cond_logic::ConditionGroup;
use cond_logic::GroupLogic;
use cond_logic::GroupNode;
use cond_logic::GroupTrace;
use cond_logic::PredicateEval;

/// Leaf predicate returning a fixed outcome and counting evaluations.
#[derive(Debug, Clone, PartialEq)]
struct Flag {
    name: &'static str,
    value: bool,
}

/// Shared evaluation counter used to observe short-circuiting.
struct Counter {
    evals: Cell<usize>,
}

impl PredicateEval for Flag {
    type Context<'a> = Counter;

    fn eval(&self, ctx: &Self::Context<'_>) -> bool {
        ctx.evals.set(ctx.evals.get() + 1);
        self.value
    }
}

fn flag(name: &'static str, value: bool) -> GroupNode<Flag> {
    GroupNode::leaf(Flag { name, value })
}

fn counter() -> Counter {
    Counter {
        evals: Cell::new(0),
    }
}

#[test]
fn empty_group_is_true_for_both_logics() {
    let and_group: ConditionGroup<Flag> = ConditionGroup::all(Vec::new());
    let or_group: ConditionGroup<Flag> = ConditionGroup::any(Vec::new());
    let ctx = counter();

    assert!(and_group.eval(&ctx));
    assert!(or_group.eval(&ctx));
    assert_eq!(ctx.evals.get(), 0);
}

#[test]
fn and_requires_all_children() {
    let group = ConditionGroup::all(vec![flag("a", true), flag("b", true)]);
    assert!(group.eval(&counter()));

    let group = ConditionGroup::all(vec![flag("a", true), flag("b", false)]);
    assert!(!group.eval(&counter()));
}

#[test]
fn or_requires_any_child() {
    let group = ConditionGroup::any(vec![flag("a", false), flag("b", true)]);
    assert!(group.eval(&counter()));

    let group = ConditionGroup::any(vec![flag("a", false), flag("b", false)]);
    assert!(!group.eval(&counter()));
}

#[test]
fn and_short_circuits_on_first_failure() {
    let group = ConditionGroup::all(vec![flag("a", false), flag("b", true), flag("c", true)]);
    let ctx = counter();

    assert!(!group.eval(&ctx));
    assert_eq!(ctx.evals.get(), 1);
}

#[test]
fn or_short_circuits_on_first_success() {
    let group = ConditionGroup::any(vec![flag("a", true), flag("b", false)]);
    let ctx = counter();

    assert!(group.eval(&ctx));
    assert_eq!(ctx.evals.get(), 1);
}

#[test]
fn nested_groups_evaluate_recursively() {
    // (a AND (b OR c)) with b false, c true.
    let inner = ConditionGroup::any(vec![flag("b", false), flag("c", true)]);
    let group = ConditionGroup::all(vec![flag("a", true), GroupNode::group(inner)]);

    assert!(group.eval(&counter()));
}

#[test]
fn nested_empty_group_counts_as_satisfied_child() {
    let inner: ConditionGroup<Flag> = ConditionGroup::any(Vec::new());
    let group = ConditionGroup::all(vec![GroupNode::group(inner), flag("a", true)]);

    assert!(group.eval(&counter()));
}

#[test]
fn predicate_count_walks_the_tree() {
    let inner = ConditionGroup::any(vec![flag("b", false), flag("c", true)]);
    let group = ConditionGroup::all(vec![flag("a", true), GroupNode::group(inner)]);

    assert_eq!(group.predicate_count(), 3);
}

#[test]
fn default_group_is_empty_and() {
    let group: ConditionGroup<Flag> = ConditionGroup::default();
    assert_eq!(group.logic, GroupLogic::And);
    assert!(group.is_empty());
    assert!(group.eval(&counter()));
}

/// Trace collector recording evaluated leaf names.
#[derive(Default)]
struct NameTrace {
    seen: Vec<(&'static str, bool)>,
}

impl GroupTrace<Flag> for NameTrace {
    fn on_predicate_evaluated(&mut self, predicate: &Flag, result: bool) {
        self.seen.push((predicate.name, result));
    }
}

#[test]
fn trace_reports_only_evaluated_leaves() {
    let group = ConditionGroup::all(vec![flag("a", true), flag("b", false), flag("c", true)]);
    let ctx = counter();
    let mut trace = NameTrace::default();

    assert!(!group.eval_with_trace(&ctx, &mut trace));
    assert_eq!(trace.seen, vec![("a", true), ("b", false)]);
}

/// Serializable leaf used to pin the wire shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct FieldCheck {
    field: String,
    expected: bool,
}

#[test]
fn groups_serialize_with_uppercase_logic_tags_and_untagged_leaves() {
    let inner: ConditionGroup<FieldCheck> = ConditionGroup::any(Vec::new());
    let group = ConditionGroup::all(vec![
        GroupNode::leaf(FieldCheck {
            field: "active".to_string(),
            expected: true,
        }),
        GroupNode::group(inner),
    ]);

    let json = serde_json::to_value(&group).unwrap();
    assert_eq!(json["logic"], "AND");
    assert_eq!(json["conditions"][0]["field"], "active");
    assert_eq!(json["conditions"][1]["logic"], "OR");

    let back: ConditionGroup<FieldCheck> = serde_json::from_value(json).unwrap();
    assert_eq!(back, group);
}
