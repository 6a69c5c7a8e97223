// crates/ruleflow-core/src/runtime/evaluator.rs
// ============================================================================
// Module: Ruleflow Evaluator
// Description: Pure rule firing loop, decision-table matching, and action application.
// Purpose: Produce deterministic outputs and traces from rule sets and inputs.
// Dependencies: bigdecimal, cond-logic, crate::{core, runtime}, serde_json
// ============================================================================

//! ## Overview
//! The evaluator is the pure algorithm: given a rule set and an input fact
//! object it produces an output object, per-rule and per-table traces, and
//! the fired-rule ordering. It is total; the only failure channel is hook
//! errors, which surface as `success=false` results at the entry points.
//! Conditions always resolve against the (effective) input, never the
//! partially built output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use bigdecimal::BigDecimal;
use cond_logic::PredicateEval;
use serde_json::Map;
use serde_json::Value;

use crate::core::Action;
use crate::core::ActionKind;
use crate::core::ColumnKind;
use crate::core::Condition;
use crate::core::DecisionTable;
use crate::core::DecisionTableResult;
use crate::core::ExecutionResult;
use crate::core::HitPolicy;
use crate::core::Row;
use crate::core::Rule;
use crate::core::RuleId;
use crate::core::RuleResult;
use crate::core::RuleSet;
use crate::runtime::operators;
use crate::runtime::path;
use crate::runtime::registry::ExecutionContext;
use crate::runtime::registry::HookError;
use crate::runtime::registry::PluginRegistry;
use crate::runtime::registry::RuleContext;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Operator assumed for condition columns that omit one.
const DEFAULT_TABLE_OPERATOR: &str = "equals";

// ============================================================================
// SECTION: Condition Evaluation
// ============================================================================

/// Evaluation context borrowed for one condition-tree walk.
pub struct EvalContext<'a> {
    /// Input fact object conditions resolve against.
    pub input: &'a Value,
    /// Plugin registry consulted before the built-in operator kernel.
    pub registry: &'a PluginRegistry,
}

impl PredicateEval for Condition {
    type Context<'a> = EvalContext<'a>;

    fn eval(&self, ctx: &Self::Context<'_>) -> bool {
        let field_value = path::resolve(ctx.input, &self.field);
        dispatch_operator(ctx.registry, &self.operator, field_value, &self.value)
    }
}

/// Dispatches an operator plugin-first, falling back to the built-in kernel.
///
/// Unknown operator names evaluate to FALSE.
fn dispatch_operator(
    registry: &PluginRegistry,
    name: &str,
    field: Option<&Value>,
    compare: &Value,
) -> bool {
    if let Some(handler) = registry.operator(name) {
        return handler(field, compare);
    }
    operators::evaluate(name, field, compare).unwrap_or(false)
}

// ============================================================================
// SECTION: Evaluation Outcome
// ============================================================================

/// Intermediate outcome of the rule and table passes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutcome {
    /// Derived output object.
    pub output: Value,
    /// Per-rule traces in evaluation order.
    pub rule_results: Vec<RuleResult>,
    /// Per-table traces in declaration order.
    pub table_results: Vec<DecisionTableResult>,
    /// Fired rule identifiers in firing order.
    pub rules_fired: Vec<RuleId>,
}

// ============================================================================
// SECTION: Rule Evaluator
// ============================================================================

/// Pure evaluator bound to a plugin registry for operator/action dispatch.
pub struct RuleEvaluator<'a> {
    /// Registry consulted for plugin operators, actions, and hooks.
    registry: &'a PluginRegistry,
}

impl<'a> RuleEvaluator<'a> {
    /// Creates an evaluator over the given registry.
    #[must_use]
    pub const fn new(registry: &'a PluginRegistry) -> Self {
        Self {
            registry,
        }
    }

    /// Evaluates one rule against an input.
    ///
    /// Disabled rules never fire; an empty condition group always fires.
    #[must_use]
    pub fn evaluate_rule(&self, rule: &Rule, input: &Value) -> RuleResult {
        if !rule.enabled {
            return RuleResult::not_fired(rule.id.clone(), rule.name.clone());
        }

        let ctx = EvalContext {
            input,
            registry: self.registry,
        };
        let fired = rule.conditions.eval(&ctx);

        RuleResult {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            fired,
            actions: if fired { rule.actions.clone() } else { Vec::new() },
        }
    }

    /// Evaluates one decision table against an input.
    #[must_use]
    pub fn evaluate_decision_table(
        &self,
        table: &DecisionTable,
        input: &Value,
    ) -> DecisionTableResult {
        let mut matched_rows = Vec::new();
        let mut actions = Vec::new();

        for row in &table.rows {
            if !row.enabled {
                continue;
            }
            if !self.row_matches(table, row, input) {
                continue;
            }

            matched_rows.push(row.id.clone());
            collect_row_actions(table, row, &mut actions);

            if table.hit_policy == HitPolicy::First {
                break;
            }
        }

        DecisionTableResult {
            table_id: table.id.clone(),
            matched_rows,
            actions,
        }
    }

    /// Returns true when every condition column accepts the row.
    fn row_matches(&self, table: &DecisionTable, row: &Row, input: &Value) -> bool {
        for column in &table.columns {
            if column.kind != ColumnKind::Condition {
                continue;
            }
            let cell = row.cell(&column.id);
            if is_wildcard_cell(cell) {
                continue;
            }
            let Some(cell) = cell else {
                continue;
            };

            let field_value = path::resolve(input, &column.field);
            let operator = column.operator.as_deref().unwrap_or(DEFAULT_TABLE_OPERATOR);
            if !dispatch_operator(self.registry, operator, field_value, cell) {
                return false;
            }
        }
        true
    }

    /// Applies one action to the output object.
    ///
    /// Plugin handlers take precedence over built-ins; CUSTOM without a
    /// handler degrades to SET and unknown kinds without a handler are
    /// silently ignored.
    pub fn apply_action(&self, output: &mut Value, action: &Action) {
        if let Some(handler) = self.registry.action(action.kind.name()) {
            handler(output, &action.field, &action.value);
            return;
        }

        match &action.kind {
            ActionKind::Set | ActionKind::Custom => {
                path::set(output, &action.field, action.value.clone());
            }
            ActionKind::Append => append_value(output, &action.field, &action.value),
            ActionKind::Increment => apply_numeric_delta(output, &action.field, &action.value, false),
            ActionKind::Decrement => apply_numeric_delta(output, &action.field, &action.value, true),
            ActionKind::Extension(_) => {}
        }
    }

    /// Runs the before-execute hook pipeline in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError`]; the caller reports it as an
    /// execution failure.
    pub fn run_before_execute(
        &self,
        mut ctx: ExecutionContext,
    ) -> Result<ExecutionContext, HookError> {
        for hook in self.registry.before_execute_hooks() {
            ctx = hook(ctx)?;
        }
        Ok(ctx)
    }

    /// Runs the after-execute hook pipeline in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError`]; the caller reports it as an
    /// execution failure.
    pub fn run_after_execute(
        &self,
        mut result: ExecutionResult,
    ) -> Result<ExecutionResult, HookError> {
        for hook in self.registry.after_execute_hooks() {
            result = hook(result)?;
        }
        Ok(result)
    }

    /// Runs the rule pass then the decision-table pass against one input.
    ///
    /// Rules are stably sorted by descending priority so equal priorities
    /// keep declaration order. Skipped rules record `fired=false` and do not
    /// run after-rule hooks.
    ///
    /// # Errors
    ///
    /// Returns the first [`HookError`] raised by rule hooks.
    pub fn run_rules_and_tables(
        &self,
        rule_set: &RuleSet,
        input: &Value,
    ) -> Result<EvalOutcome, HookError> {
        let mut output = Value::Object(Map::new());
        let mut rule_results = Vec::with_capacity(rule_set.rules.len());
        let mut rules_fired = Vec::new();

        let mut ordered: Vec<&Rule> = rule_set.rules.iter().collect();
        ordered.sort_by(|left, right| right.priority.cmp(&left.priority));

        for rule in ordered {
            let mut rule_ctx = RuleContext {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                skip: false,
                result: None,
            };
            for hook in self.registry.before_rule_hooks() {
                hook(&mut rule_ctx)?;
            }

            if rule_ctx.skip {
                rule_results.push(RuleResult::not_fired(rule.id.clone(), rule.name.clone()));
                continue;
            }

            let result = self.evaluate_rule(rule, input);
            if result.fired {
                for action in &result.actions {
                    self.apply_action(&mut output, action);
                }
                rules_fired.push(rule.id.clone());
            }

            rule_ctx.result = Some(result.clone());
            for hook in self.registry.after_rule_hooks() {
                hook(&rule_ctx)?;
            }
            rule_results.push(result);
        }

        let mut table_results = Vec::with_capacity(rule_set.decision_tables.len());
        for table in &rule_set.decision_tables {
            let result = self.evaluate_decision_table(table, input);
            for action in &result.actions {
                self.apply_action(&mut output, action);
            }
            table_results.push(result);
        }

        Ok(EvalOutcome {
            output,
            rule_results,
            table_results,
            rules_fired,
        })
    }

    /// Executes the rule and table passes plus after-execute hooks against an
    /// effective input already transformed by before-execute hooks.
    ///
    /// `started` anchors the reported execution time to the beginning of the
    /// whole execution, hooks included.
    #[must_use]
    pub fn execute_prepared(
        &self,
        rule_set: &RuleSet,
        effective_input: Value,
        started: Instant,
    ) -> ExecutionResult {
        let outcome = match self.run_rules_and_tables(rule_set, &effective_input) {
            Ok(outcome) => outcome,
            Err(err) => {
                return ExecutionResult::failure(
                    effective_input,
                    err.to_string(),
                    elapsed_ms(started),
                );
            }
        };

        let input_snapshot = effective_input.clone();
        let result = ExecutionResult {
            success: true,
            input: effective_input,
            output: outcome.output,
            rule_results: outcome.rule_results,
            table_results: outcome.table_results,
            rules_fired: outcome.rules_fired,
            execution_time_ms: elapsed_ms(started),
            error: None,
        };

        match self.run_after_execute(result) {
            Ok(result) => result,
            Err(err) => {
                ExecutionResult::failure(input_snapshot, err.to_string(), elapsed_ms(started))
            }
        }
    }

    /// Executes the full pure pipeline: before hooks, rules, tables, after
    /// hooks. Hook failures surface as `success=false` results.
    #[must_use]
    pub fn execute_rule_set(&self, rule_set: &RuleSet, input: Value) -> ExecutionResult {
        let started = Instant::now();
        let snapshot = input.clone();
        let ctx = ExecutionContext {
            rule_set_id: rule_set.id.clone(),
            rule_set_name: rule_set.name.clone(),
            input,
            metadata: Value::Null,
        };

        match self.run_before_execute(ctx) {
            Ok(ctx) => self.execute_prepared(rule_set, ctx.input, started),
            Err(err) => ExecutionResult::failure(snapshot, err.to_string(), elapsed_ms(started)),
        }
    }
}

// ============================================================================
// SECTION: Pure Entry Points
// ============================================================================

/// Evaluates one rule with no plugins, adapters, or hooks.
#[must_use]
pub fn evaluate_rule(rule: &Rule, input: &Value) -> RuleResult {
    let registry = PluginRegistry::new();
    RuleEvaluator::new(&registry).evaluate_rule(rule, input)
}

/// Evaluates one decision table with no plugins, adapters, or hooks.
#[must_use]
pub fn evaluate_decision_table(table: &DecisionTable, input: &Value) -> DecisionTableResult {
    let registry = PluginRegistry::new();
    RuleEvaluator::new(&registry).evaluate_decision_table(table, input)
}

/// Executes a rule set with no plugins, adapters, or hooks.
#[must_use]
pub fn execute_rule_set(rule_set: &RuleSet, input: Value) -> ExecutionResult {
    let registry = PluginRegistry::new();
    RuleEvaluator::new(&registry).execute_rule_set(rule_set, input)
}

// ============================================================================
// SECTION: Cell Semantics
// ============================================================================

/// Returns true when a condition cell matches any field value.
///
/// Wildcards are absent cells, nulls, empty strings, and the literal `"*"`.
fn is_wildcard_cell(cell: Option<&Value>) -> bool {
    match cell {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty() || text == "*",
        Some(_) => false,
    }
}

/// Returns true when an action cell carries no value to emit.
///
/// Unlike condition wildcards, a literal `"*"` is a legitimate action value.
fn is_empty_action_cell(cell: Option<&Value>) -> bool {
    match cell {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Emits actions for every non-empty action cell of a matched row.
fn collect_row_actions(table: &DecisionTable, row: &Row, actions: &mut Vec<Action>) {
    for column in &table.columns {
        if column.kind != ColumnKind::Action {
            continue;
        }
        let cell = row.cell(&column.id);
        if is_empty_action_cell(cell) {
            continue;
        }
        let Some(cell) = cell else {
            continue;
        };

        actions.push(Action {
            kind: column.action_type.clone().unwrap_or(ActionKind::Set),
            field: column.field.clone(),
            value: cell.clone(),
        });
    }
}

// ============================================================================
// SECTION: Built-in Action Application
// ============================================================================

/// Pushes a value onto a sequence at the path, seeding one when absent or
/// when the current value is not a sequence.
fn append_value(output: &mut Value, field: &str, value: &Value) {
    let updated = match path::resolve(output, field) {
        Some(Value::Array(items)) => {
            let mut items = items.clone();
            items.push(value.clone());
            Value::Array(items)
        }
        _ => Value::Array(vec![value.clone()]),
    };
    path::set(output, field, updated);
}

/// Adds or subtracts a numeric delta at the path.
///
/// The current value coerces numerically with absent (and non-numeric)
/// treated as zero; a non-numeric delta leaves the output untouched.
fn apply_numeric_delta(output: &mut Value, field: &str, value: &Value, negate: bool) {
    let Some(delta) = operators::coerce_decimal(value) else {
        return;
    };
    let current = path::resolve(output, field)
        .and_then(operators::coerce_decimal)
        .unwrap_or_else(|| BigDecimal::from(0));

    let result = if negate { current - delta } else { current + delta };
    if let Some(number) = operators::decimal_to_value(&result) {
        path::set(output, field, number);
    }
}

// ============================================================================
// SECTION: Timing
// ============================================================================

/// Elapsed milliseconds since `started`, saturating on overflow.
pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
