// crates/cond-logic/src/traits.rs
// ============================================================================
// Module: Condition Logic Traits
// Description: Evaluation contracts for leaf predicates and trace observers.
// Purpose: Define how domains evaluate predicates and observe group walks.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Domains implement [`PredicateEval`] for their leaf predicate type and pass
//! an evaluation context by reference. Trace observers receive a callback per
//! evaluated leaf; leaves skipped by short-circuiting are never reported.

// ============================================================================
// SECTION: Predicate Trait
// ============================================================================

/// Core trait for evaluating a leaf predicate against a domain context.
///
/// The context is a domain-specific bundle (an input fact object, a dispatch
/// table, or both) borrowed for the duration of one group walk.
pub trait PredicateEval {
    /// Domain-specific evaluation context.
    type Context<'a>;

    /// Evaluates the predicate against the context.
    ///
    /// Implementations must be total: unknown operators, missing fields, and
    /// shape mismatches evaluate to `false` rather than failing.
    fn eval(&self, ctx: &Self::Context<'_>) -> bool;
}

// ============================================================================
// SECTION: Trace Observer
// ============================================================================

/// Observer invoked for every leaf predicate evaluated during a group walk.
pub trait GroupTrace<P> {
    /// Called after a leaf predicate has been evaluated.
    fn on_predicate_evaluated(&mut self, predicate: &P, result: bool);
}

/// Trace observer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrace;

impl<P> GroupTrace<P> for NoopTrace {
    fn on_predicate_evaluated(&mut self, _predicate: &P, _result: bool) {}
}
