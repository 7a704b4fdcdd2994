//! Invariant-violation channel.
//!
//! A diagnostic marks one item an operation had to skip: the surrounding
//! update still completes. Callers should treat a non-empty diagnostic list as
//! a partial failure. Every diagnostic is also logged on the
//! `blocksim::diagnostics` tracing target.

use serde::Serialize;
use std::fmt;

use crate::types::PredicateKey;

pub const TARGET: &str = "blocksim::diagnostics";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// A guard needs a categorical predicate the hypothesis does not know;
    /// the estimator cannot branch on categorical values
    CategoricalInsufficiency { action: String, predicate: PredicateKey },

    /// Two different rules carry an effect literal of the same type
    DuplicateRuleMatch {
        action: String,
        effect: String,
        first: usize,
        second: usize,
    },

    /// One rule carries two effect literals of the same type
    DuplicateLiteralInRule {
        action: String,
        effect: String,
        rule: usize,
    },

    /// A term is already renamed on one side of an alignment but not
    /// consistently on the other
    AlignmentAnomaly {
        action: String,
        rule: usize,
        rule_term: String,
        clause_term: String,
    },

    /// A rule precondition has no same-type literal left in the clause
    MissingCounterpart {
        action: String,
        rule: usize,
        literal: String,
    },

    /// A generality check was attempted on literals that are not compatible
    IncompatibleGenerality {
        action: String,
        left: String,
        right: String,
    },

    /// The rule-local variable alphabet ran out
    VariableCapacityExhausted { action: String, rule: usize },
}

impl Diagnostic {
    /// Log the diagnostic and hand it back for collection
    pub fn emit(self) -> Self {
        tracing::error!(target: TARGET, diagnostic = %self, "invariant violation");
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::CategoricalInsufficiency { action, predicate } => write!(
                f,
                "categorical predicate {} is required but unknown for action '{}'",
                predicate, action
            ),
            Diagnostic::DuplicateRuleMatch { action, effect, first, second } => write!(
                f,
                "action '{}': rules {} and {} both have an effect of type {}",
                action, first, second, effect
            ),
            Diagnostic::DuplicateLiteralInRule { action, effect, rule } => write!(
                f,
                "action '{}': rule {} has two effects of type {}",
                action, rule, effect
            ),
            Diagnostic::AlignmentAnomaly { action, rule, rule_term, clause_term } => write!(
                f,
                "action '{}': rule {} aligns {} with {} inconsistently",
                action, rule, rule_term, clause_term
            ),
            Diagnostic::MissingCounterpart { action, rule, literal } => write!(
                f,
                "action '{}': rule {} precondition {} has no counterpart in the example",
                action, rule, literal
            ),
            Diagnostic::IncompatibleGenerality { action, left, right } => write!(
                f,
                "action '{}': generality of {} against incompatible {}",
                action, left, right
            ),
            Diagnostic::VariableCapacityExhausted { action, rule } => write!(
                f,
                "action '{}': rule {} ran out of variable names",
                action, rule
            ),
        }
    }
}
