use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::Result;
use crate::logic::{Clause, Literal};

/// A learned rule: one effect literal, its preconditions, and the examples
/// it was confirmed or refuted by.
///
/// Every example the learner has seen sits in exactly one of the three sets.
/// `skipped` holds examples whose effect matched this rule but could not be
/// absorbed because the update ended in a diagnostic.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rule {
    pub clause: Clause,
    pub positive: BTreeSet<usize>,
    pub negative: BTreeSet<usize>,
    pub skipped: BTreeSet<usize>,
}

impl Rule {
    /// A maximally specific rule built from one example: every earlier example
    /// counts as negative
    pub fn seed(preconditions: Vec<Literal>, effect: Literal, example: usize) -> Self {
        Rule {
            clause: Clause::new(preconditions, vec![effect]),
            positive: BTreeSet::from([example]),
            negative: (0..example).collect(),
            skipped: BTreeSet::new(),
        }
    }

    pub fn effect(&self) -> &Literal {
        &self.clause.effects[0]
    }

    pub fn preconditions(&self) -> &[Literal] {
        &self.clause.preconditions
    }

    pub fn mark_positive(&mut self, example: usize) {
        self.negative.remove(&example);
        self.skipped.remove(&example);
        self.positive.insert(example);
    }

    pub fn mark_negative(&mut self, example: usize) {
        if !self.positive.contains(&example) && !self.skipped.contains(&example) {
            self.negative.insert(example);
        }
    }

    pub fn mark_skipped(&mut self, example: usize) {
        if !self.positive.contains(&example) {
            self.negative.remove(&example);
            self.skipped.insert(example);
        }
    }

    /// Whether examples `0..count` each sit in exactly one of the three sets
    pub fn accounts_for(&self, count: usize) -> bool {
        let sizes = self.positive.len() + self.negative.len() + self.skipped.len();
        sizes == count
            && (0..count).all(|example| {
                self.positive.contains(&example) || self.negative.contains(&example) || self.skipped.contains(&example)
            })
    }

    /// Whether the rule already explains `effect` as observed in `clause`.
    ///
    /// The rule's effect must be at least as general as `effect`, and every
    /// rule precondition needs a compatible, no more general counterpart among
    /// the clause's preconditions.
    pub fn covers(&self, effect: &Literal, clause: &Clause) -> Result<bool> {
        if !self.effect().is_more_general_than(effect)? {
            return Ok(false);
        }
        self.preconditions_hold_for(clause)
    }

    pub fn preconditions_hold_for(&self, clause: &Clause) -> Result<bool> {
        for precondition in self.preconditions() {
            let mut matches = 0;
            for candidate in &clause.preconditions {
                if precondition.is_compatible_with(candidate) && precondition.is_more_general_than(candidate)? {
                    matches += 1;
                }
            }
            match matches {
                0 => return Ok(false),
                1 => {}
                // preconditions are matched one by one, not as a group
                _ => tracing::warn!(literal = %precondition, matches, "precondition matched more than once"),
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} <-", self.effect())?;
        for literal in self.preconditions() {
            writeln!(f, "\t{}", literal)?;
        }
        write!(f, "E+ {:?} E- {:?}", self.positive, self.negative)?;
        if !self.skipped.is_empty() {
            write!(f, " skipped {:?}", self.skipped)?;
        }
        Ok(())
    }
}
