//! Incremental rule learning from observed transitions.
//!
//! One [`ActionLearner`] per action. Every transition handed to
//! [`ActionLearner::add_example`] is translated into a ground clause
//! (preconditions from the previous state, effects from what changed), bound
//! against the action's parameters, and folded into the rule set: an effect no
//! rule explains yet seeds a new maximally specific rule, an effect a rule
//! already covers confirms it, and anything else generalizes the matching rule.
//!
//! ```rust
//! use blocksim::learner::{ActionLearner, Interpretation, Translation, TranslationTable};
//! use blocksim::types::{ParamKinds, Params, PredicateKey, State};
//!
//! let table = TranslationTable::new().name(
//!     "armEmpty",
//!     Translation::new("armEmpty", Interpretation::UnaryObject { object_kind: "obj".into() }),
//! );
//! let mut learner = ActionLearner::new("pick", table);
//!
//! let prev: State = [(PredicateKey::object(-1, "armEmpty"), true.into())].into();
//! let next: State = [(PredicateKey::object(-1, "armEmpty"), false.into())].into();
//! let params = Params::new().with("arm", -1);
//! let kinds: ParamKinds = [("arm".to_string(), "obj".to_string())].into();
//!
//! let report = learner.add_example(&prev, &params, &kinds, &next).unwrap();
//! assert_eq!(report.created, vec![0]);
//! assert_eq!(learner.rules()[0].effect().to_string(), "NOT armEmpty($arm)");
//! ```

pub mod derived;
pub mod generalize;
pub mod relevance;
pub mod rule;
pub mod translate;

pub use derived::{augment, DerivedPredicates};
pub use generalize::{generalize, AlignmentError, VariableNames};
pub use relevance::restrict_to_relevant;
pub use rule::Rule;
pub use translate::{Interpretation, Translation, TranslationTable};

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::logic::{Clause, Literal};
use crate::types::{ParamKinds, Params, State};

/// A raw transition as handed to the learner
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub prev: State,
    pub params: Params,
    pub param_kinds: ParamKinds,
    pub next: State,
}

/// A transition together with the ground clause it was translated into
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Example {
    pub transition: Transition,
    pub clause: Clause,
}

/// What one example did to the rule set
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LearnReport {
    /// Index of the example in the learner's log
    pub example: usize,
    pub created: Vec<usize>,
    pub confirmed: Vec<usize>,
    pub generalized: Vec<usize>,
    /// Rules the example matched but could not update; they record it as skipped
    pub skipped: Vec<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LearnReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub struct ActionLearner {
    name: String,
    table: TranslationTable,
    derived: Vec<Arc<dyn DerivedPredicates>>,
    rules: Vec<Rule>,
    examples: Vec<Example>,
}

impl ActionLearner {
    pub fn new(name: impl Into<String>, table: TranslationTable) -> Self {
        ActionLearner {
            name: name.into(),
            table,
            derived: Vec::new(),
            rules: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// Add a derived-predicate function, run on the previous state of every example
    pub fn with_derived(mut self, derived: Arc<dyn DerivedPredicates>) -> Self {
        self.derived.push(derived);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Translate a transition into a clause bound against the action's parameters
    pub fn clause_for(&self, prev: &State, params: &Params, kinds: &ParamKinds, next: &State) -> Result<Clause> {
        let augmented = augment(prev, params, &self.derived)?;
        let before = restrict_to_relevant(self.table.translate(&augmented, params)?, params);
        let after = restrict_to_relevant(self.table.translate(next, params)?, params);

        let effects: Vec<Literal> = after
            .into_iter()
            .filter(|literal| !before.iter().any(|known| known.same_as(literal)))
            .collect();

        let mut clause = Clause::new(before, effects);
        clause.bind_parameters(params, kinds);
        Ok(clause)
    }

    /// Record a transition and update the rule set.
    ///
    /// Only malformed input (unknown parameters, untranslatable values) is an
    /// error. Invariant violations skip the affected rule and are returned as
    /// diagnostics; the rest of the example is still learned. A skipped rule
    /// records the example in its `skipped` set, every other rule in its
    /// positive or negative set.
    pub fn add_example(&mut self, prev: &State, params: &Params, kinds: &ParamKinds, next: &State) -> Result<LearnReport> {
        let clause = self.clause_for(prev, params, kinds, next)?;
        let example = self.examples.len();
        self.examples.push(Example {
            transition: Transition {
                prev: prev.clone(),
                params: params.clone(),
                param_kinds: kinds.clone(),
                next: next.clone(),
            },
            clause: clause.clone(),
        });

        let mut report = LearnReport {
            example,
            ..LearnReport::default()
        };
        let mut touched = BTreeSet::new();

        for effect in &clause.effects {
            let found = match self.find_compatible_rule(effect) {
                Ok(found) => found,
                Err(diagnostic) => {
                    let rules = match &diagnostic {
                        Diagnostic::DuplicateRuleMatch { first, second, .. } => vec![*first, *second],
                        Diagnostic::DuplicateLiteralInRule { rule, .. } => vec![*rule],
                        _ => Vec::new(),
                    };
                    for index in rules {
                        self.rules[index].mark_skipped(example);
                        touched.insert(index);
                        report.skipped.push(index);
                    }
                    report.diagnostics.push(diagnostic);
                    continue;
                }
            };

            let Some(index) = found else {
                let index = self.rules.len();
                tracing::info!(action = %self.name, effect = %effect, rule = index, "new rule");
                self.rules.push(Rule::seed(clause.preconditions.clone(), effect.clone(), example));
                touched.insert(index);
                report.created.push(index);
                continue;
            };
            touched.insert(index);

            match self.rules[index].covers(effect, &clause) {
                Ok(true) => {
                    tracing::info!(action = %self.name, rule = index, example, "positive example confirmed");
                    self.rules[index].mark_positive(example);
                    report.confirmed.push(index);
                }
                Ok(false) => {
                    tracing::warn!(action = %self.name, rule = index, example, "rule must be generalized");
                    match generalize(&self.rules[index], effect, &clause) {
                        Ok(mut generalized) => {
                            generalized.mark_positive(example);
                            self.rules[index] = generalized;
                            report.generalized.push(index);
                        }
                        Err(err) => {
                            report.diagnostics.push(self.alignment_diagnostic(index, err));
                            self.rules[index].mark_skipped(example);
                            report.skipped.push(index);
                        }
                    }
                }
                Err(err) => {
                    report.diagnostics.push(
                        Diagnostic::IncompatibleGenerality {
                            action: self.name.clone(),
                            left: self.rules[index].effect().to_string(),
                            right: format!("{} ({})", effect, err),
                        }
                        .emit(),
                    );
                    self.rules[index].mark_skipped(example);
                    report.skipped.push(index);
                }
            }
        }

        for (index, rule) in self.rules.iter_mut().enumerate() {
            if !touched.contains(&index) {
                rule.mark_negative(example);
            }
        }
        Ok(report)
    }

    /// The one rule whose effect is compatible with `effect`, if any.
    ///
    /// Effect types must map to at most one rule, and to at most one literal
    /// within that rule.
    pub fn find_compatible_rule(&self, effect: &Literal) -> std::result::Result<Option<usize>, Diagnostic> {
        let mut found = None;
        for (index, rule) in self.rules.iter().enumerate() {
            let matches = rule
                .clause
                .effects
                .iter()
                .filter(|literal| literal.is_compatible_with(effect))
                .count();
            if matches > 1 {
                return Err(Diagnostic::DuplicateLiteralInRule {
                    action: self.name.clone(),
                    effect: effect.to_string(),
                    rule: index,
                }
                .emit());
            }
            if matches == 1 {
                if let Some(first) = found {
                    return Err(Diagnostic::DuplicateRuleMatch {
                        action: self.name.clone(),
                        effect: effect.to_string(),
                        first,
                        second: index,
                    }
                    .emit());
                }
                found = Some(index);
            }
        }
        Ok(found)
    }

    fn alignment_diagnostic(&self, rule: usize, err: AlignmentError) -> Diagnostic {
        let action = self.name.clone();
        let diagnostic = match err {
            AlignmentError::Anomaly { rule_term, clause_term } => Diagnostic::AlignmentAnomaly {
                action,
                rule,
                rule_term,
                clause_term,
            },
            AlignmentError::MissingCounterpart { literal } => Diagnostic::MissingCounterpart { action, rule, literal },
            AlignmentError::IncompatibleEffects { rule: left, clause: right } => {
                Diagnostic::IncompatibleGenerality { action, left, right }
            }
            AlignmentError::VariableCapacity => Diagnostic::VariableCapacityExhausted { action, rule },
        };
        diagnostic.emit()
    }

    /// The rule set as pretty-printed JSON
    pub fn dump_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.rules)?)
    }
}

impl fmt::Display for ActionLearner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ACTION {}: {} rules from {} examples",
            self.name,
            self.rules.len(),
            self.examples.len()
        )?;
        for (index, rule) in self.rules.iter().enumerate() {
            writeln!(f, "RULE {}: {}", index, rule)?;
        }
        Ok(())
    }
}
