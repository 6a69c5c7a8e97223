// crates/cond-logic/src/lib.rs
// ============================================================================
// Module: Condition Logic Root
// Description: Public API surface for the condition group algebra.
// Purpose: Wire together the group tree, evaluation traits, and re-exports.
// Dependencies: crate::{group, traits}
// ============================================================================

//! ## Overview
//! This crate provides a domain-agnostic Boolean algebra over typed leaf
//! predicates: recursively nestable AND/OR groups with short-circuit
//! evaluation and an optional trace hook. Domains inject their own predicate
//! type at the leaves and supply the evaluation context.

// ============================================================================
// SECTION: Core Modules
// ============================================================================

pub mod group;
pub mod traits;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use group::ConditionGroup;
pub use group::GroupLogic;
pub use group::GroupNode;
pub use traits::GroupTrace;
pub use traits::NoopTrace;
pub use traits::PredicateEval;
