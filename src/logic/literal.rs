use serde::{Deserialize, Serialize};
use std::fmt;

use super::term::{Generality, Term};
use crate::error::{Result, SimError};
use crate::types::Value;

/// A signed, named atom over an ordered list of typed terms
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub positive: bool,
    pub name: String,
    pub terms: Vec<Term>,
}

impl Literal {
    pub fn new(positive: bool, name: impl Into<String>, terms: Vec<Term>) -> Self {
        Literal {
            positive,
            name: name.into(),
            terms,
        }
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Same predicate name, polarity ignored
    pub fn is_same_type(&self, other: &Literal) -> bool {
        self.name == other.name
    }

    /// Same polarity and name
    pub fn is_compatible_with(&self, other: &Literal) -> bool {
        self.positive == other.positive && self.name == other.name
    }

    /// Compatible and every term structurally equal
    pub fn same_as(&self, other: &Literal) -> bool {
        self == other
    }

    /// Whether this literal is at least as general as `other`.
    ///
    /// Asking this of incompatible literals is a usage error. Two variables in
    /// the same position have no defined ordering; that case is logged and
    /// resolved by name equality.
    pub fn is_more_general_than(&self, other: &Literal) -> Result<bool> {
        if !self.is_compatible_with(other) {
            return Err(SimError::incompatible_literals(self, other));
        }
        if self.arity() != other.arity() {
            return Ok(false);
        }
        for (mine, theirs) in self.terms.iter().zip(other.terms.iter()) {
            match mine.generality(theirs)? {
                Generality::MoreGeneral => {}
                Generality::NotMoreGeneral => return Ok(false),
                Generality::Ambiguous => {
                    tracing::warn!(left = %mine, right = %theirs, "comparing generality of two variables");
                    if mine != theirs {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// Ground values of the constant terms; these are the objects the literal
    /// connects when literals are read as hyperedges
    pub fn constants(&self) -> impl Iterator<Item = &Option<Value>> {
        self.terms.iter().filter_map(Term::constant_value)
    }

    pub fn is_ground(&self) -> bool {
        !self.terms.iter().any(Term::is_variable)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.positive {
            write!(f, "NOT ")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(arm: Term, object: Term) -> Literal {
        Literal::new(true, "objectHeld", vec![arm, object])
    }

    #[test]
    fn test_compatibility() {
        let a = Literal::new(true, "armEmpty", vec![Term::constant("obj", -1)]);
        let b = Literal::new(false, "armEmpty", vec![Term::constant("obj", -1)]);
        assert!(!a.is_compatible_with(&b));
        assert!(a.is_same_type(&b));
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_generality_on_incompatible_literals_is_an_error() {
        let a = Literal::new(true, "armEmpty", vec![Term::constant("obj", -1)]);
        let b = Literal::new(false, "armEmpty", vec![Term::constant("obj", -1)]);
        assert!(matches!(a.is_more_general_than(&b), Err(SimError::IncompatibleLiterals { .. })));
    }

    #[test]
    fn test_variable_literal_covers_ground_literal() {
        let general = holding(Term::parameter("obj", "arm"), Term::variable("obj", "X"));
        let specific = holding(Term::parameter("obj", "arm"), Term::constant("obj", 2));
        assert!(general.is_more_general_than(&specific).unwrap());
        assert!(!specific.is_more_general_than(&general).unwrap());
    }

    #[test]
    fn test_display() {
        let lit = Literal::new(false, "kinPick", vec![Term::parameter("conf", "q"), Term::constant("pos", (0, 1))]);
        assert_eq!(lit.to_string(), "NOT kinPick($q, (0, 1))");
        let held = holding(Term::constant("obj", -1), Term::nil("obj"));
        assert_eq!(held.to_string(), "objectHeld(-1, none)");
    }
}
