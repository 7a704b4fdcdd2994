use std::fmt;

use super::guard::Subject;
use crate::belief::HypothesisView;
use crate::error::Result;
use crate::types::{Cell, Params, PredicateKey, Value};

/// A pending assignment produced by an effect
#[derive(Clone, Debug, PartialEq)]
pub struct Write {
    pub key: PredicateKey,
    pub value: Cell,
}

/// One write of an action rule
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Copy the current value of another predicate
    CopyPredicate {
        subject: Subject,
        predicate: String,
        source: Subject,
        source_predicate: String,
    },
    SetValue {
        subject: Subject,
        predicate: String,
        value: Value,
    },
    SetFromParam {
        subject: Subject,
        predicate: String,
        param: String,
    },
}

impl Effect {
    pub fn copy(subject: &str, predicate: &str, source: &str, source_predicate: &str) -> Self {
        Effect::CopyPredicate {
            subject: Subject::param(subject),
            predicate: predicate.to_string(),
            source: Subject::param(source),
            source_predicate: source_predicate.to_string(),
        }
    }

    pub fn value(subject: &str, predicate: &str, value: impl Into<Value>) -> Self {
        Effect::SetValue {
            subject: Subject::param(subject),
            predicate: predicate.to_string(),
            value: value.into(),
        }
    }

    pub fn param(subject: &str, predicate: &str, param: &str) -> Self {
        Effect::SetFromParam {
            subject: Subject::param(subject),
            predicate: predicate.to_string(),
            param: param.to_string(),
        }
    }

    /// Compute the write against the pre-action hypothesis. Never mutates.
    pub fn apply(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Write> {
        match self {
            Effect::CopyPredicate { subject, predicate, source, source_predicate } => {
                let source_key = source.key(params, source_predicate)?;
                Ok(Write {
                    key: subject.key(params, predicate)?,
                    value: hyp.get(&source_key)?.clone(),
                })
            }
            Effect::SetValue { subject, predicate, value } => Ok(Write {
                key: subject.key(params, predicate)?,
                value: Cell::Known(value.clone()),
            }),
            Effect::SetFromParam { subject, predicate, param } => Ok(Write {
                key: subject.key(params, predicate)?,
                value: Cell::Known(params.require(param)?.clone()),
            }),
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::CopyPredicate { subject, predicate, source, source_predicate } => {
                write!(f, "{}.{} := {}.{}", subject, predicate, source, source_predicate)
            }
            Effect::SetValue { subject, predicate, value } => {
                write!(f, "{}.{} := {}", subject, predicate, value)
            }
            Effect::SetFromParam { subject, predicate, param } => {
                write!(f, "{}.{} := {}", subject, predicate, param)
            }
        }
    }
}
