use std::fmt;
use std::sync::Arc;

use crate::belief::HypothesisView;
use crate::error::Result;
use crate::types::{Params, PredicateKey, Value};

/// The object a guard or effect talks about
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    /// The object index bound to this action parameter
    Param(String),
    Global,
}

impl Subject {
    pub fn param(name: impl Into<String>) -> Self {
        Subject::Param(name.into())
    }

    /// Resolve the schema slot `subject.predicate` under the given bindings
    pub fn key(&self, params: &Params, predicate: &str) -> Result<PredicateKey> {
        match self {
            Subject::Param(name) => Ok(PredicateKey::object(params.object(name)?, predicate)),
            Subject::Global => Ok(PredicateKey::global(predicate)),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Param(name) => write!(f, "{}", name),
            Subject::Global => write!(f, "*"),
        }
    }
}

/// What an external decision procedure concluded
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decision {
    pub holds: bool,
    /// Derived parameters, visible to later guards and effects of the same rule
    pub bindings: Vec<(String, Value)>,
}

impl Decision {
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bindings.push((name.into(), value.into()));
        self
    }
}

impl From<bool> for Decision {
    fn from(holds: bool) -> Self {
        Decision {
            holds,
            bindings: Vec::new(),
        }
    }
}

/// External decision procedure used by function guards (kinematic
/// feasibility, support checks, ...)
pub trait DecisionFn: Send + Sync {
    fn name(&self) -> &str;

    /// Decide against a hypothesis
    fn decide(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Decision>;

    /// Sufficiency mode: the currently unknown predicates this procedure would
    /// need before it can decide
    fn required_unknowns(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Vec<PredicateKey>>;
}

/// One activation condition of an action rule
#[derive(Clone)]
pub enum Guard {
    /// `subject.predicate` holds a literal value
    StateEquals {
        subject: Subject,
        predicate: String,
        value: Value,
    },
    /// `subject.predicate` holds the value bound to an action parameter
    ParamEquals {
        subject: Subject,
        predicate: String,
        param: String,
    },
    /// An external procedure returns the expected result
    Function {
        func: Arc<dyn DecisionFn>,
        expected: bool,
    },
}

impl Guard {
    pub fn state(subject: &str, predicate: &str, value: impl Into<Value>) -> Self {
        Guard::StateEquals {
            subject: Subject::param(subject),
            predicate: predicate.to_string(),
            value: value.into(),
        }
    }

    pub fn param(subject: &str, predicate: &str, param: &str) -> Self {
        Guard::ParamEquals {
            subject: Subject::param(subject),
            predicate: predicate.to_string(),
            param: param.to_string(),
        }
    }

    pub fn function(func: Arc<dyn DecisionFn>, expected: bool) -> Self {
        Guard::Function { func, expected }
    }

    /// Evaluate the guard; the returned decision's `holds` says whether the
    /// guard is satisfied
    pub fn evaluate(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Decision> {
        match self {
            Guard::StateEquals { subject, predicate, value } => {
                let key = subject.key(params, predicate)?;
                Ok(hyp.get(&key)?.holds(value).into())
            }
            Guard::ParamEquals { subject, predicate, param } => {
                let key = subject.key(params, predicate)?;
                let expected = params.require(param)?;
                Ok(hyp.get(&key)?.holds(expected).into())
            }
            Guard::Function { func, expected } => {
                let decision = func.decide(params, hyp)?;
                Ok(Decision {
                    holds: decision.holds == *expected,
                    bindings: decision.bindings,
                })
            }
        }
    }

    pub fn is_activated(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<bool> {
        Ok(self.evaluate(params, hyp)?.holds)
    }

    /// Predicates this guard needs but the hypothesis does not know
    pub fn required_unknowns(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Vec<PredicateKey>> {
        match self {
            Guard::StateEquals { subject, predicate, .. } | Guard::ParamEquals { subject, predicate, .. } => {
                let key = subject.key(params, predicate)?;
                if hyp.get(&key)?.is_unknown() {
                    Ok(vec![key])
                } else {
                    Ok(Vec::new())
                }
            }
            Guard::Function { func, .. } => func.required_unknowns(params, hyp),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::StateEquals { subject, predicate, value } => {
                write!(f, "{}.{} = {}", subject, predicate, value)
            }
            Guard::ParamEquals { subject, predicate, param } => {
                write!(f, "{}.{} = {}", subject, predicate, param)
            }
            Guard::Function { func, expected } => write!(f, "{}() = {}", func.name(), expected),
        }
    }
}
