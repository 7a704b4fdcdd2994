use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::literal::Literal;
use crate::types::{ParamKinds, Params};

/// Precondition literals plus effect literals
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub preconditions: Vec<Literal>,
    pub effects: Vec<Literal>,
}

impl Clause {
    pub fn new(preconditions: Vec<Literal>, effects: Vec<Literal>) -> Self {
        Clause { preconditions, effects }
    }

    /// Replace constants that equal a bound action argument (same kind, same
    /// value) with a reference to that argument.
    ///
    /// Parameters without a declared kind are left alone.
    pub fn bind_parameters(&mut self, params: &Params, kinds: &ParamKinds) {
        for (name, value) in params.iter() {
            let Some(kind) = kinds.get(name) else {
                continue;
            };
            for literal in self.preconditions.iter_mut().chain(self.effects.iter_mut()) {
                for term in literal.terms.iter_mut() {
                    term.bind_parameter(name, kind, value);
                }
            }
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.preconditions.iter().chain(self.effects.iter())
    }

    pub fn literals_mut(&mut self) -> impl Iterator<Item = &mut Literal> {
        self.preconditions.iter_mut().chain(self.effects.iter_mut())
    }

    /// Names of the rule-local variables in use
    pub fn variables(&self) -> BTreeSet<String> {
        self.literals()
            .flat_map(|literal| literal.terms.iter())
            .filter_map(|term| term.variable_name().map(str::to_string))
            .collect()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CLAUSE, {} effects, {} preconds",
            self.effects.len(),
            self.preconditions.len()
        )?;
        writeln!(f, "EFFECTS:")?;
        for literal in &self.effects {
            writeln!(f, "\t{}", literal)?;
        }
        writeln!(f, "PRECONDS:")?;
        for literal in &self.preconditions {
            writeln!(f, "\t{}", literal)?;
        }
        Ok(())
    }
}
