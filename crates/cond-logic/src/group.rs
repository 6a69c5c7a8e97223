// crates/cond-logic/src/group.rs
// ============================================================================
// Module: Condition Group Tree
// Description: Recursive AND/OR groups over typed leaf predicates.
// Purpose: Define `ConditionGroup`, `GroupNode`, and short-circuit evaluation.
// Dependencies: serde::{Deserialize, Serialize}, smallvec::SmallVec
// ============================================================================

//! ## Overview
//! A [`ConditionGroup`] combines an ordered list of nodes under AND or OR
//! semantics. Nodes are either domain leaves or nested groups, so arbitrarily
//! deep trees are expressible without reference counting: the tree is owned
//! and acyclic. Evaluation short-circuits and an empty group is TRUE under
//! either logic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;

use crate::traits::GroupTrace;
use crate::traits::NoopTrace;
use crate::traits::PredicateEval;

// ============================================================================
// SECTION: Group Logic
// ============================================================================

/// Combinator applied to the children of a condition group.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupLogic {
    /// All children must be satisfied. Short-circuits on the first failure.
    And,
    /// At least one child must be satisfied. Short-circuits on the first success.
    Or,
}

// ============================================================================
// SECTION: Group Nodes
// ============================================================================

/// One element of a condition group: a leaf predicate or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupNode<P> {
    /// A nested group combined under its own logic.
    Group(ConditionGroup<P>),
    /// A domain-specific leaf predicate.
    Leaf(P),
}

impl<P> GroupNode<P> {
    /// Creates a leaf node from a predicate.
    pub const fn leaf(predicate: P) -> Self {
        Self::Leaf(predicate)
    }

    /// Creates a nested group node.
    pub const fn group(group: ConditionGroup<P>) -> Self {
        Self::Group(group)
    }

    /// Evaluates this node against the context, reporting leaves to the trace.
    fn eval_node<T>(&self, ctx: &P::Context<'_>, trace: &mut T) -> bool
    where
        P: PredicateEval,
        T: GroupTrace<P>,
    {
        match self {
            Self::Leaf(predicate) => {
                let result = predicate.eval(ctx);
                trace.on_predicate_evaluated(predicate, result);
                result
            }
            Self::Group(group) => group.eval_with_trace(ctx, trace),
        }
    }

    /// Counts the leaf predicates beneath this node.
    fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group(group) => group.predicate_count(),
        }
    }
}

// ============================================================================
// SECTION: Condition Group
// ============================================================================

/// A recursively nestable AND/OR node over leaf predicates.
///
/// # Invariants
/// - An empty group evaluates to TRUE regardless of its logic.
/// - Children evaluate in declaration order with short-circuiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup<P> {
    /// Combinator applied to the children.
    pub logic: GroupLogic,
    /// Ordered children: leaves or nested groups.
    pub conditions: SmallVec<[Box<GroupNode<P>>; 4]>,
}

impl<P> ConditionGroup<P> {
    /// Creates a group from a logic mode and child nodes.
    pub fn new(logic: GroupLogic, nodes: Vec<GroupNode<P>>) -> Self {
        Self {
            logic,
            conditions: nodes.into_iter().map(Box::new).collect(),
        }
    }

    /// Creates an AND group over the given nodes.
    pub fn all(nodes: Vec<GroupNode<P>>) -> Self {
        Self::new(GroupLogic::And, nodes)
    }

    /// Creates an OR group over the given nodes.
    pub fn any(nodes: Vec<GroupNode<P>>) -> Self {
        Self::new(GroupLogic::Or, nodes)
    }

    /// Returns true when the group has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Counts the leaf predicates in the whole tree.
    #[must_use]
    pub fn predicate_count(&self) -> usize {
        self.conditions.iter().map(|node| node.leaf_count()).sum()
    }

    /// Evaluates the group against the context with short-circuiting.
    #[must_use]
    pub fn eval(&self, ctx: &P::Context<'_>) -> bool
    where
        P: PredicateEval,
    {
        self.eval_with_trace(ctx, &mut NoopTrace)
    }

    /// Evaluates the group, reporting every evaluated leaf to the trace.
    ///
    /// Short-circuiting still applies: leaves skipped by an early AND failure
    /// or OR success are not reported.
    pub fn eval_with_trace<T>(&self, ctx: &P::Context<'_>, trace: &mut T) -> bool
    where
        P: PredicateEval,
        T: GroupTrace<P>,
    {
        // Empty groups are trivially satisfied under either logic.
        if self.conditions.is_empty() {
            return true;
        }

        match self.logic {
            GroupLogic::And => {
                for node in &self.conditions {
                    if !node.eval_node(ctx, trace) {
                        return false;
                    }
                }
                true
            }
            GroupLogic::Or => {
                for node in &self.conditions {
                    if node.eval_node(ctx, trace) {
                        return true;
                    }
                }
                false
            }
        }
    }
}

impl<P> Default for ConditionGroup<P> {
    /// Creates an empty AND group (trivially satisfied).
    fn default() -> Self {
        Self {
            logic: GroupLogic::And,
            conditions: SmallVec::new(),
        }
    }
}
