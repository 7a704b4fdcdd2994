//! # Action models
//!
//! An action is a list of guarded rules evaluated against a single hypothesis
//! and a set of bound action parameters.
//!
//! - [`Guard`]: an activation condition. Either a slot equals a literal value,
//!   a slot equals a parameter, or an external [`DecisionFn`] returns the
//!   expected result.
//! - [`Effect`]: a write. Copy another slot, set a literal value, or set a
//!   parameter's value.
//! - [`ActionRule`]: guards are a conjunction; effects are computed against the
//!   pre-action hypothesis and returned as [`Write`]s, never applied in place.
//! - [`ActionRuleBased`]: a named action whose activated rules fire together.
//!   When two rules write the same key the later rule wins; such conflicts are
//!   not detected.

pub mod effect;
pub mod guard;
pub mod rule;

pub use effect::{Effect, Write};
pub use guard::{Decision, DecisionFn, Guard, Subject};
pub use rule::{ActionRule, ActionRuleBased, Firing};

use std::collections::BTreeMap;

use crate::error::{Result, SimError};

/// The named actions one estimator runs with
#[derive(Clone, Debug, Default)]
pub struct ActionModel {
    actions: BTreeMap<String, ActionRuleBased>,
}

impl ActionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: ActionRuleBased) -> Self {
        self.insert(action);
        self
    }

    pub fn insert(&mut self, action: ActionRuleBased) {
        self.actions.insert(action.name.clone(), action);
    }

    pub fn get(&self, name: &str) -> Result<&ActionRuleBased> {
        self.actions
            .get(name)
            .ok_or_else(|| SimError::UnknownAction(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.actions.keys()
    }
}
