use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Result, SimError};
use crate::types::{Cell, Observations, PredicateKey, PredicateKind, State, Value};

/// Ordered predicate slots: boolean predicates first, then categorical ones
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    keys: Vec<PredicateKey>,
    bool_count: usize,
    index: HashMap<PredicateKey, usize>,
}

/// One entry of a scenario's initial conditions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialCondition {
    pub key: PredicateKey,
    pub kind: PredicateKind,
    pub value: Value,
}

impl InitialCondition {
    pub fn new(key: PredicateKey, kind: PredicateKind, value: impl Into<Value>) -> Self {
        InitialCondition {
            key,
            kind,
            value: value.into(),
        }
    }
}

impl Schema {
    /// Build a schema; a key listed twice keeps its first slot
    pub fn new(bool_preds: Vec<PredicateKey>, cat_preds: Vec<PredicateKey>) -> Self {
        let mut schema = Schema {
            keys: Vec::with_capacity(bool_preds.len() + cat_preds.len()),
            bool_count: 0,
            index: HashMap::new(),
        };
        for key in bool_preds {
            if schema.push(key) {
                schema.bool_count += 1;
            }
        }
        for key in cat_preds {
            schema.push(key);
        }
        schema
    }

    /// Derive the schema and the initial observation from initial conditions
    pub fn from_initial_conditions(conditions: &[InitialCondition]) -> (Self, Observations) {
        let mut bool_preds = Vec::new();
        let mut cat_preds = Vec::new();
        let mut initial = Observations::new();
        for condition in conditions {
            match condition.kind {
                PredicateKind::Bool => bool_preds.push(condition.key.clone()),
                PredicateKind::Cat => cat_preds.push(condition.key.clone()),
            }
            initial.insert(condition.key.clone(), condition.value.clone());
        }
        (Schema::new(bool_preds, cat_preds), initial)
    }

    fn push(&mut self, key: PredicateKey) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.keys.len());
        self.keys.push(key);
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn bool_count(&self) -> usize {
        self.bool_count
    }

    pub fn slot(&self, key: &PredicateKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn require_slot(&self, key: &PredicateKey) -> Result<usize> {
        self.slot(key).ok_or_else(|| SimError::unknown_predicate(key))
    }

    pub fn key(&self, slot: usize) -> &PredicateKey {
        &self.keys[slot]
    }

    pub fn kind(&self, slot: usize) -> PredicateKind {
        if slot < self.bool_count {
            PredicateKind::Bool
        } else {
            PredicateKind::Cat
        }
    }

    pub fn is_bool(&self, key: &PredicateKey) -> bool {
        matches!(self.slot(key), Some(slot) if slot < self.bool_count)
    }

    pub fn keys(&self) -> &[PredicateKey] {
        &self.keys
    }

    /// A fully known hypothesis over a schema made of the state's own keys,
    /// so decision functions can be run on a plain state
    pub fn snapshot(state: &State) -> (Self, Hypothesis) {
        let (bools, cats): (Vec<_>, Vec<_>) = state
            .iter()
            .partition(|(_, value)| matches!(value, Value::Bool(_)));
        let schema = Schema::new(
            bools.iter().map(|(key, _)| (*key).clone()).collect(),
            cats.iter().map(|(key, _)| (*key).clone()).collect(),
        );
        let mut hypothesis = Hypothesis::unknown(schema.len());
        for (key, value) in state {
            if let Some(slot) = schema.slot(key) {
                hypothesis.set(slot, Cell::Known(value.clone()));
            }
        }
        (schema, hypothesis)
    }
}

/// One candidate assignment over every schema slot
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hypothesis {
    cells: Vec<Cell>,
}

impl Hypothesis {
    pub fn unknown(len: usize) -> Self {
        Hypothesis {
            cells: vec![Cell::Unknown; len],
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, slot: usize) -> &Cell {
        &self.cells[slot]
    }

    pub fn set(&mut self, slot: usize, value: Cell) {
        self.cells[slot] = value;
    }

    /// Number of unknown slots among the first `count` (the boolean block)
    pub fn unknown_count(&self, count: usize) -> usize {
        self.cells[..count].iter().filter(|c| c.is_unknown()).count()
    }
}

/// A hypothesis read through its schema, handed to guards and decision functions
#[derive(Clone, Copy)]
pub struct HypothesisView<'a> {
    schema: &'a Schema,
    hypothesis: &'a Hypothesis,
}

impl<'a> HypothesisView<'a> {
    pub fn new(schema: &'a Schema, hypothesis: &'a Hypothesis) -> Self {
        HypothesisView { schema, hypothesis }
    }

    pub fn get(&self, key: &PredicateKey) -> Result<&'a Cell> {
        let slot = self.schema.require_slot(key)?;
        Ok(self.hypothesis.cell(slot))
    }

    /// Like [`HypothesisView::get`], `None` for keys outside the schema
    pub fn lookup(&self, key: &PredicateKey) -> Option<&'a Cell> {
        self.schema.slot(key).map(|slot| self.hypothesis.cell(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a PredicateKey, &'a Cell)> + 'a {
        let schema: &'a Schema = self.schema;
        let hypothesis: &'a Hypothesis = self.hypothesis;
        schema
            .keys()
            .iter()
            .enumerate()
            .map(move |(slot, key)| (key, hypothesis.cell(slot)))
    }

    /// Every slot whose predicate is called `name`, in schema order
    pub fn named(&self, name: &'a str) -> impl Iterator<Item = (&'a PredicateKey, &'a Cell)> + 'a {
        let view = *self;
        view.iter().filter(move |(key, _)| key.name == name)
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_orders_bool_before_cat() {
        let conditions = vec![
            InitialCondition::new(PredicateKey::object(-1, "pos"), PredicateKind::Cat, (0, 2)),
            InitialCondition::new(PredicateKey::object(-1, "armEmpty"), PredicateKind::Bool, true),
        ];
        let (schema, initial) = Schema::from_initial_conditions(&conditions);
        assert_eq!(schema.key(0), &PredicateKey::object(-1, "armEmpty"));
        assert_eq!(schema.kind(1), PredicateKind::Cat);
        assert_eq!(schema.bool_count(), 1);
        assert_eq!(initial.len(), 2);
    }

    #[test]
    fn test_duplicate_keys_keep_first_slot() {
        let key = PredicateKey::object(0, "movable");
        let schema = Schema::new(vec![key.clone(), key.clone()], vec![key.clone()]);
        assert_eq!(schema.len(), 1);
        assert!(schema.is_bool(&key));
    }

    #[test]
    fn test_view_lookup() {
        let schema = Schema::new(vec![PredicateKey::object(0, "movable")], vec![PredicateKey::object(0, "pos")]);
        let mut hyp = Hypothesis::unknown(schema.len());
        hyp.set(1, Cell::Known(Value::Coord(0, 1)));
        let view = HypothesisView::new(&schema, &hyp);
        assert!(view.get(&PredicateKey::object(0, "movable")).unwrap().is_unknown());
        assert_eq!(view.named("pos").count(), 1);
        assert!(view.get(&PredicateKey::object(5, "pos")).is_err());
        assert!(view.lookup(&PredicateKey::object(5, "pos")).is_none());
    }

    #[test]
    fn test_snapshot_of_state() {
        let state: State = [
            (PredicateKey::object(0, "pos"), Value::Coord(0, 1)),
            (PredicateKey::object(-1, "armEmpty"), Value::Bool(true)),
        ]
        .into();
        let (schema, hyp) = Schema::snapshot(&state);
        assert_eq!(schema.bool_count(), 1);
        let view = HypothesisView::new(&schema, &hyp);
        assert!(view.get(&PredicateKey::object(-1, "armEmpty")).unwrap().holds(&Value::Bool(true)));
        assert!(view.iter().all(|(_, cell)| !cell.is_unknown()));
    }
}
