use std::fmt;

use super::effect::{Effect, Write};
use super::guard::Guard;
use crate::belief::HypothesisView;
use crate::error::Result;
use crate::types::{Params, PredicateKey};

/// Guards (a conjunction) and the effects written when they all hold
#[derive(Clone, Debug)]
pub struct ActionRule {
    pub guards: Vec<Guard>,
    pub effects: Vec<Effect>,
}

impl ActionRule {
    pub fn new(guards: Vec<Guard>, effects: Vec<Effect>) -> Self {
        ActionRule { guards, effects }
    }

    /// Evaluate the guards in order. Returns the parameters extended with
    /// every derived binding when all guards hold.
    pub fn activate(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Option<Params>> {
        let mut bound = params.clone();
        for guard in &self.guards {
            let decision = guard.evaluate(&bound, hyp)?;
            if !decision.holds {
                tracing::debug!(guard = %guard, "rule not activated");
                return Ok(None);
            }
            for (name, value) in decision.bindings {
                bound.insert(name, value);
            }
        }
        Ok(Some(bound))
    }

    pub fn is_activated(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<bool> {
        Ok(self.activate(params, hyp)?.is_some())
    }

    pub fn apply(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Vec<Write>> {
        self.effects.iter().map(|effect| effect.apply(params, hyp)).collect()
    }
}

impl fmt::Display for ActionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, guard) in self.guards.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", guard)?;
        }
        write!(f, " => ")?;
        for (i, effect) in self.effects.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", effect)?;
        }
        Ok(())
    }
}

/// An action name bound to its rules. All rules whose guards hold fire together.
#[derive(Clone, Debug)]
pub struct ActionRuleBased {
    pub name: String,
    pub rules: Vec<ActionRule>,
}

/// Writes collected from one hypothesis plus how many rules produced them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Firing {
    pub writes: Vec<Write>,
    pub activated: Vec<usize>,
}

impl ActionRuleBased {
    pub fn new(name: impl Into<String>, rules: Vec<ActionRule>) -> Self {
        ActionRuleBased {
            name: name.into(),
            rules,
        }
    }

    /// Every unknown predicate any guard of any rule would need
    pub fn required_unknowns(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Vec<PredicateKey>> {
        let mut missing = Vec::new();
        for rule in &self.rules {
            for guard in &rule.guards {
                missing.extend(guard.required_unknowns(params, hyp)?);
            }
        }
        Ok(missing)
    }

    /// Evaluate all rules against the same pre-action snapshot.
    ///
    /// Writes come back in rule order; applying them in sequence lets a later
    /// rule win when two rules write the same key.
    pub fn fire(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Firing> {
        let mut firing = Firing::default();
        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(bound) = rule.activate(params, hyp)? {
                tracing::debug!(action = %self.name, rule = index, "rule activated");
                firing.writes.extend(rule.apply(&bound, hyp)?);
                firing.activated.push(index);
            }
        }
        Ok(firing)
    }
}
