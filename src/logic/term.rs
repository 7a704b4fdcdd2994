use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimError};
use crate::types::Value;

/// How a term is bound.
///
/// Constants are the most specific, parameters stand for a named action
/// argument, variables are rule-local and universally quantified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// A ground value; `None` is the "no object" constant
    Constant(Option<Value>),
    Parameter(String),
    Variable(String),
}

/// Outcome of asking whether one term is at least as general as another
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generality {
    MoreGeneral,
    NotMoreGeneral,
    /// Both terms are variables; there is no defined answer
    Ambiguous,
}

/// A typed term: a declared kind (`obj`, `pos`, `conf`, ...) plus a role
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub kind: String,
    pub role: Role,
}

impl Term {
    pub fn constant(kind: impl Into<String>, value: impl Into<Value>) -> Self {
        Term {
            kind: kind.into(),
            role: Role::Constant(Some(value.into())),
        }
    }

    pub fn nil(kind: impl Into<String>) -> Self {
        Term {
            kind: kind.into(),
            role: Role::Constant(None),
        }
    }

    pub fn parameter(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Term {
            kind: kind.into(),
            role: Role::Parameter(name.into()),
        }
    }

    pub fn variable(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Term {
            kind: kind.into(),
            role: Role::Variable(name.into()),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.role, Role::Constant(_))
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.role, Role::Parameter(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.role, Role::Variable(_))
    }

    /// The ground value of a constant term
    pub fn constant_value(&self) -> Option<&Option<Value>> {
        match &self.role {
            Role::Constant(v) => Some(v),
            _ => None,
        }
    }

    pub fn variable_name(&self) -> Option<&str> {
        match &self.role {
            Role::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn generality(&self, other: &Term) -> Result<Generality> {
        if self.kind != other.kind {
            return Err(SimError::KindMismatch {
                left: self.kind.clone(),
                right: other.kind.clone(),
            });
        }
        let generality = match (&self.role, &other.role) {
            (Role::Variable(_), Role::Variable(_)) => Generality::Ambiguous,
            (Role::Variable(_), _) => Generality::MoreGeneral,
            (a, b) if a == b => Generality::MoreGeneral,
            _ => Generality::NotMoreGeneral,
        };
        Ok(generality)
    }

    /// Rewrite a matching constant into a reference to the action parameter `name`
    pub fn bind_parameter(&mut self, name: &str, kind: &str, value: &Value) -> bool {
        let matches = self.kind == kind
            && matches!(&self.role, Role::Constant(Some(v)) if v == value);
        if matches {
            self.role = Role::Parameter(name.to_string());
        }
        matches
    }

    pub fn make_variable(&mut self, name: impl Into<String>) {
        self.role = Role::Variable(name.into());
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Role::Constant(Some(v)) => write!(f, "{}", v),
            Role::Constant(None) => write!(f, "none"),
            Role::Parameter(name) => write!(f, "${}", name),
            Role::Variable(name) => write!(f, "{}", name),
        }
    }
}
