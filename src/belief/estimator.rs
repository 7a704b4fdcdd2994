use std::collections::BTreeSet;
use std::fmt;

use super::hypothesis::{Hypothesis, HypothesisView, Schema};
use crate::action_model::ActionRuleBased;
use crate::diagnostics::Diagnostic;
use crate::error::{Result, SimError};
use crate::types::{Cell, Comparison, Observations, Params, PredicateKey, Value};

/// Outcome of [`StateEstimator::observe`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObserveReport {
    /// False when the estimator is inactive and the call was not forced
    pub applied: bool,
    /// Hypotheses dropped because they contradicted the observation
    pub removed: usize,
    /// Every hypothesis contradicted the observation and the belief state was
    /// reseeded with one all-unknown hypothesis
    pub reseeded: bool,
}

/// Outcome of [`StateEstimator::apply_action`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionReport {
    pub applied: bool,
    /// Hypotheses that had to be split before the rules could be evaluated
    pub split: usize,
    /// Hypotheses created by splitting
    pub created: usize,
    /// Rule activations summed over all hypotheses
    pub activations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Counts of one compaction pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub removed: usize,
    pub added: usize,
}

/// Totals of a compaction run to its fixed point
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompactionReport {
    /// Passes run, the final no-op pass included
    pub passes: usize,
    pub removed: usize,
    pub added: usize,
}

/// Multi-hypothesis state estimator.
///
/// Owns a belief state: a disjunctive set of hypotheses over one schema.
/// Actions split hypotheses on unknown boolean predicates their guards need;
/// observations drop contradicted hypotheses; compaction merges hypotheses
/// that differ in a single boolean slot. Compaction never runs on its own.
pub struct StateEstimator {
    label: String,
    schema: Schema,
    hypotheses: Vec<Hypothesis>,
    active: bool,
    verbose: bool,
}

impl StateEstimator {
    /// An active estimator holding a single all-unknown hypothesis
    pub fn new(label: impl Into<String>, schema: Schema) -> Self {
        let hypotheses = vec![Hypothesis::unknown(schema.len())];
        StateEstimator {
            label: label.into(),
            schema,
            hypotheses,
            active: true,
            verbose: false,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Start from a given belief state instead of one all-unknown hypothesis
    pub fn with_hypotheses(mut self, hypotheses: Vec<Hypothesis>) -> Result<Self> {
        if hypotheses.is_empty() {
            return Err(SimError::invalid_parameter("hypotheses", "at least one hypothesis is required"));
        }
        if let Some(bad) = hypotheses.iter().find(|h| h.cells().len() != self.schema.len()) {
            return Err(SimError::invalid_parameter(
                "hypotheses".to_string(),
                format!("expected {} slots, got {}", self.schema.len(), bad.cells().len()),
            ));
        }
        self.hypotheses = hypotheses;
        Ok(self)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn num_hypotheses(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    pub fn view(&self, index: usize) -> Option<HypothesisView<'_>> {
        self.hypotheses
            .get(index)
            .map(|hyp| HypothesisView::new(&self.schema, hyp))
    }

    /// Drop everything and start over from one all-unknown hypothesis
    pub fn reset(&mut self) {
        self.hypotheses = vec![Hypothesis::unknown(self.schema.len())];
    }

    /// Fold an observation into every hypothesis.
    ///
    /// Unknown slots are filled in; a known slot that disagrees drops the
    /// hypothesis. If nothing survives, the model could not explain the
    /// observed history: this is logged and the belief state is reseeded.
    pub fn observe(&mut self, observations: &Observations, force: bool) -> Result<ObserveReport> {
        if !self.active && !force {
            return Ok(ObserveReport::default());
        }
        let observed = observations
            .iter()
            .map(|(key, value)| Ok((self.schema.require_slot(key)?, key, value)))
            .collect::<Result<Vec<_>>>()?;

        let before = self.hypotheses.len();
        let mut survivors = Vec::with_capacity(before);
        for (index, mut hyp) in self.hypotheses.drain(..).enumerate() {
            let mut contradicted = false;
            for &(slot, key, value) in &observed {
                match hyp.cell(slot) {
                    Cell::Unknown => hyp.set(slot, Cell::Known(value.clone())),
                    Cell::Known(current) if current != value => {
                        if self.verbose {
                            tracing::warn!(
                                estimator = %self.label,
                                hypothesis = index,
                                predicate = %key,
                                "observation mismatch"
                            );
                        }
                        contradicted = true;
                        break;
                    }
                    Cell::Known(_) => {}
                }
            }
            if !contradicted {
                survivors.push(hyp);
            }
        }

        let mut report = ObserveReport {
            applied: true,
            removed: before - survivors.len(),
            reseeded: false,
        };
        self.hypotheses = survivors;
        if self.hypotheses.is_empty() {
            tracing::error!(
                estimator = %self.label,
                "no hypothesis describes the observations: the model is incomplete"
            );
            self.reset();
            report.reseeded = true;
        }
        Ok(report)
    }

    /// Apply an action: split on unknown boolean predicates the guards need,
    /// then fire every activated rule in every hypothesis.
    pub fn apply_action(&mut self, action: &ActionRuleBased, params: &Params) -> Result<ActionReport> {
        if !self.active {
            return Ok(ActionReport::default());
        }
        let mut report = ActionReport {
            applied: true,
            ..ActionReport::default()
        };

        // sufficiency scan
        let mut plans = Vec::with_capacity(self.hypotheses.len());
        for hyp in &self.hypotheses {
            let view = HypothesisView::new(&self.schema, hyp);
            let mut missing = BTreeSet::new();
            for key in action.required_unknowns(params, &view)? {
                let slot = self.schema.require_slot(&key)?;
                if slot < self.schema.bool_count() {
                    missing.insert(slot);
                } else {
                    let diagnostic = Diagnostic::CategoricalInsufficiency {
                        action: action.name.clone(),
                        predicate: key,
                    };
                    if !report.diagnostics.contains(&diagnostic) {
                        report.diagnostics.push(diagnostic.emit());
                    }
                }
            }
            plans.push(missing.into_iter().collect::<Vec<_>>());
        }

        // split
        let mut next = Vec::with_capacity(self.hypotheses.len());
        let mut children = Vec::new();
        for (index, (hyp, missing)) in self.hypotheses.iter().zip(plans.iter()).enumerate() {
            if missing.is_empty() {
                next.push(hyp.clone());
                continue;
            }
            if self.verbose {
                let names: Vec<String> = missing.iter().map(|&s| self.schema.key(s).to_string()).collect();
                tracing::warn!(estimator = %self.label, hypothesis = index, missing = ?names, "splitting hypothesis");
            }
            report.split += 1;
            children.extend(split(hyp, missing)?);
        }
        report.created = children.len();
        next.extend(children);

        // fire
        for hyp in next.iter_mut() {
            let firing = action.fire(params, &HypothesisView::new(&self.schema, hyp))?;
            report.activations += firing.activated.len();
            for write in firing.writes {
                let slot = self.schema.require_slot(&write.key)?;
                hyp.set(slot, write.value);
            }
        }

        self.hypotheses = next;
        Ok(report)
    }

    /// Run compaction passes until one performs no merge
    pub fn hypothesis_removal(&mut self) -> CompactionReport {
        let mut total = CompactionReport::default();
        if !self.active {
            return total;
        }
        loop {
            let pass = self.hypothesis_removal_pass();
            total.passes += 1;
            total.removed += pass.removed;
            total.added += pass.added;
            if pass.removed == 0 {
                return total;
            }
        }
    }

    /// One compaction pass over every unordered pair of hypotheses.
    ///
    /// A pair merges when both have the same number of unknown boolean slots
    /// and exactly one boolean slot is known on both sides with different
    /// values. The merge is the first hypothesis of the pair with that slot
    /// reset to unknown. Removals and insertions apply after the full pass.
    pub fn hypothesis_removal_pass(&mut self) -> PassReport {
        let bools = self.schema.bool_count();
        let mut removed = BTreeSet::new();
        let mut added: Vec<Hypothesis> = Vec::new();

        for i in 0..self.hypotheses.len() {
            for j in (i + 1)..self.hypotheses.len() {
                let (a, b) = (&self.hypotheses[i], &self.hypotheses[j]);
                if a.unknown_count(bools) != b.unknown_count(bools) {
                    continue;
                }
                let mut differing = (0..bools).filter(|&slot| a.cell(slot).compare(b.cell(slot)) == Comparison::Differ);
                let (Some(slot), None) = (differing.next(), differing.next()) else {
                    continue;
                };
                removed.insert(i);
                removed.insert(j);
                let mut merged = a.clone();
                merged.set(slot, Cell::Unknown);
                if !added.contains(&merged) {
                    added.push(merged);
                }
            }
        }

        let report = PassReport {
            removed: removed.len(),
            added: added.len(),
        };
        if report.removed > 0 {
            if self.verbose {
                tracing::warn!(
                    estimator = %self.label,
                    removed = report.removed,
                    added = report.added,
                    "compacted hypotheses"
                );
            }
            let mut index = 0;
            self.hypotheses.retain(|_| {
                let keep = !removed.contains(&index);
                index += 1;
                keep
            });
            self.hypotheses.extend(added);
        }
        report
    }

    /// Slots known and equal across every hypothesis, in schema order
    pub fn core(&self) -> Vec<(PredicateKey, Value)> {
        let Some((first, rest)) = self.hypotheses.split_first() else {
            return Vec::new();
        };
        (0..self.schema.len())
            .filter_map(|slot| {
                let value = first.cell(slot).value()?;
                rest.iter()
                    .all(|hyp| hyp.cell(slot).compare(first.cell(slot)) == Comparison::Equal)
                    .then(|| (self.schema.key(slot).clone(), value.clone()))
            })
            .collect()
    }

    /// The certain value of one predicate, if every hypothesis agrees on it
    pub fn certain(&self, key: &PredicateKey) -> Result<Option<Value>> {
        let slot = self.schema.require_slot(key)?;
        let Some((first, rest)) = self.hypotheses.split_first() else {
            return Ok(None);
        };
        let agreed = rest
            .iter()
            .all(|hyp| hyp.cell(slot).compare(first.cell(slot)) == Comparison::Equal);
        Ok(if agreed { first.cell(slot).value().cloned() } else { None })
    }
}

/// Replace one hypothesis by one copy per truth assignment of `missing`, in
/// binary-counter order with the first slot as least significant bit
fn split(hyp: &Hypothesis, missing: &[usize]) -> Result<Vec<Hypothesis>> {
    let count = u32::try_from(missing.len())
        .ok()
        .and_then(|width| 1usize.checked_shl(width))
        .ok_or(SimError::SplitTooWide { width: missing.len() })?;
    Ok((0..count)
        .map(|assignment| {
            let mut child = hyp.clone();
            for (bit, &slot) in missing.iter().enumerate() {
                child.set(slot, Cell::Known(Value::Bool(assignment >> bit & 1 == 1)));
            }
            child
        })
        .collect())
}

impl fmt::Display for StateEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Estimator '{}' with {} hypotheses",
            self.label,
            self.hypotheses.len()
        )?;
        let core: Vec<String> = self.core().iter().map(|(key, _)| key.to_string()).collect();
        writeln!(f, "core: {:?}", core)?;
        for (index, hyp) in self.hypotheses.iter().enumerate() {
            write!(f, "{:>3} |", index)?;
            for (key, cell) in self.schema.keys().iter().zip(hyp.cells()) {
                write!(f, " {}={}", key, cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_model::{ActionRule, Effect, Guard};

    fn key(s: &str) -> PredicateKey {
        s.parse().unwrap()
    }

    fn estimator() -> StateEstimator {
        let schema = Schema::new(
            vec![key("0.movable"), key("0.slippery"), key("-1.armEmpty")],
            vec![key("0.pos")],
        );
        StateEstimator::new("test", schema)
    }

    fn observations(pairs: &[(&str, Value)]) -> Observations {
        pairs.iter().map(|(k, v)| (key(k), v.clone())).collect()
    }

    #[test]
    fn test_observe_fills_unknowns() {
        let mut est = estimator();
        let report = est
            .observe(&observations(&[("0.movable", Value::Bool(true))]), false)
            .unwrap();
        assert!(report.applied);
        assert_eq!(est.certain(&key("0.movable")).unwrap(), Some(Value::Bool(true)));
        assert_eq!(est.certain(&key("0.slippery")).unwrap(), None);
    }

    #[test]
    fn test_observe_unknown_predicate_is_an_error() {
        let mut est = estimator();
        assert!(est.observe(&observations(&[("7.movable", Value::Bool(true))]), false).is_err());
        assert_eq!(est.num_hypotheses(), 1);
    }

    #[test]
    fn test_inactive_estimator_ignores_unforced_observations() {
        let mut est = estimator().with_active(false);
        let obs = observations(&[("0.movable", Value::Bool(true))]);
        assert!(!est.observe(&obs, false).unwrap().applied);
        assert!(est.core().is_empty());
        assert!(est.observe(&obs, true).unwrap().applied);
        assert_eq!(est.core().len(), 1);
    }

    #[test]
    fn test_split_is_binary_counter_ordered() {
        let mut est = estimator();
        let action = ActionRuleBased::new(
            "check",
            vec![ActionRule::new(
                vec![Guard::state("b", "movable", true), Guard::state("b", "slippery", true)],
                vec![],
            )],
        );
        let report = est.apply_action(&action, &Params::new().with("b", 0)).unwrap();
        assert_eq!(report.split, 1);
        assert_eq!(report.created, 4);
        let rows: Vec<(Cell, Cell)> = est
            .hypotheses()
            .iter()
            .map(|h| (h.cell(0).clone(), h.cell(1).clone()))
            .collect();
        let b = |v| Cell::Known(Value::Bool(v));
        assert_eq!(
            rows,
            vec![(b(false), b(false)), (b(true), b(false)), (b(false), b(true)), (b(true), b(true))]
        );
        assert_eq!(report.activations, 1);
    }

    #[test]
    fn test_categorical_insufficiency_is_diagnosed_not_split() {
        let mut est = estimator();
        let action = ActionRuleBased::new(
            "goto",
            vec![ActionRule::new(vec![Guard::param("b", "pos", "p")], vec![Effect::value("b", "movable", false)])],
        );
        let report = est
            .apply_action(&action, &Params::new().with("b", 0).with("p", (0, 1)))
            .unwrap();
        assert_eq!(est.num_hypotheses(), 1);
        assert_eq!(report.split, 0);
        assert!(matches!(
            report.diagnostics.as_slice(),
            [Diagnostic::CategoricalInsufficiency { .. }]
        ));
        assert_eq!(report.activations, 0);
    }

    #[test]
    fn test_merge_resets_the_differing_slot() {
        let mut est = estimator();
        let mut a = Hypothesis::unknown(4);
        a.set(0, Cell::Known(Value::Bool(true)));
        a.set(2, Cell::Known(Value::Bool(true)));
        let mut b = a.clone();
        b.set(0, Cell::Known(Value::Bool(false)));
        est.hypotheses = vec![a.clone(), b];

        let pass = est.hypothesis_removal_pass();
        assert_eq!(pass, PassReport { removed: 2, added: 1 });
        assert_eq!(est.num_hypotheses(), 1);
        assert!(est.hypotheses()[0].cell(0).is_unknown());
        assert_eq!(est.hypotheses()[0].cell(2), a.cell(2));

        assert_eq!(est.hypothesis_removal_pass(), PassReport::default());
    }

    #[test]
    fn test_no_merge_across_different_unknown_counts() {
        let mut est = estimator();
        let mut a = Hypothesis::unknown(4);
        a.set(0, Cell::Known(Value::Bool(true)));
        a.set(1, Cell::Known(Value::Bool(true)));
        let mut b = Hypothesis::unknown(4);
        b.set(0, Cell::Known(Value::Bool(false)));
        est.hypotheses = vec![a, b];
        assert_eq!(est.hypothesis_removal().removed, 0);
        assert_eq!(est.num_hypotheses(), 2);
    }

    #[test]
    fn test_core_excludes_unknown_and_disagreeing_slots() {
        let mut est = estimator();
        let mut a = Hypothesis::unknown(4);
        a.set(0, Cell::Known(Value::Bool(true)));
        a.set(1, Cell::Known(Value::Bool(true)));
        a.set(3, Cell::Known(Value::Coord(0, 1)));
        let mut b = a.clone();
        b.set(1, Cell::Known(Value::Bool(false)));
        est.hypotheses = vec![a, b];
        assert_eq!(
            est.core(),
            vec![(key("0.movable"), Value::Bool(true)), (key("0.pos"), Value::Coord(0, 1))]
        );
    }

    #[test]
    fn test_split_wider_than_a_counter_is_rejected() {
        let width = usize::BITS as usize;
        let schema = Schema::new((0..width as i64).map(|i| PredicateKey::object(i, "flag")).collect(), vec![]);
        let mut est = StateEstimator::new("wide", schema);
        let check = ActionRuleBased::new(
            "check",
            vec![ActionRule::new(
                (0..width).map(|i| Guard::state(&format!("o{}", i), "flag", true)).collect(),
                vec![],
            )],
        );
        let params: Params = (0..width).map(|i| (format!("o{}", i), Value::Int(i as i64))).collect();

        let err = est.apply_action(&check, &params).unwrap_err();
        assert_eq!(err, SimError::SplitTooWide { width });
        assert_eq!(est.hypotheses(), &[Hypothesis::unknown(width)]);

        let children = split(&Hypothesis::unknown(2), &[0, 1]).unwrap();
        assert_eq!(children.len(), 4);
    }
}
