use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SimError};
use crate::logic::{Literal, Term};
use crate::types::{Params, PredicateKey, State, Value};

/// How the raw value of one predicate becomes a literal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Interpretation {
    /// `name(object)`, negated when the value is false
    UnaryObject { object_kind: String },
    /// `name(object, value)`, always positive. A value equal to `nil` becomes
    /// the "no object" constant
    ObjectValue {
        object_kind: String,
        value_kind: String,
        #[serde(default)]
        nil: Option<Value>,
    },
    /// `name(params...)` over the named action arguments, negated when the
    /// value is false
    FromParams { params: Vec<(String, String)> },
    /// `name(components...)` over the components of a compound value, always positive
    Components { kinds: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    /// Name of the produced literal
    pub literal: String,
    pub interpretation: Interpretation,
}

impl Translation {
    pub fn new(literal: impl Into<String>, interpretation: Interpretation) -> Self {
        Translation {
            literal: literal.into(),
            interpretation,
        }
    }
}

/// Per-predicate translation table. Entries keyed by a full predicate key take
/// precedence over entries keyed by predicate name; predicates with no entry
/// produce no literal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationTable {
    #[serde(default)]
    by_name: BTreeMap<String, Translation>,
    #[serde(default)]
    by_key: BTreeMap<PredicateKey, Translation>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, predicate: &str, translation: Translation) -> Self {
        self.by_name.insert(predicate.to_string(), translation);
        self
    }

    pub fn key(mut self, key: PredicateKey, translation: Translation) -> Self {
        self.by_key.insert(key, translation);
        self
    }

    pub fn lookup(&self, key: &PredicateKey) -> Option<&Translation> {
        self.by_key.get(key).or_else(|| self.by_name.get(&key.name))
    }

    /// Translate a raw state into ground literals, in state order
    pub fn translate(&self, state: &State, params: &Params) -> Result<Vec<Literal>> {
        let mut literals = Vec::new();
        for (key, value) in state {
            match self.lookup(key) {
                Some(translation) => literals.push(translation.apply(key, value, params)?),
                None => tracing::debug!(predicate = %key, "no translation, skipped"),
            }
        }
        Ok(literals)
    }
}

impl Translation {
    pub fn apply(&self, key: &PredicateKey, value: &Value, params: &Params) -> Result<Literal> {
        match &self.interpretation {
            Interpretation::UnaryObject { object_kind } => Ok(Literal::new(
                polarity(key, value)?,
                &self.literal,
                vec![Term::constant(object_kind, object_of(key)?)],
            )),
            Interpretation::ObjectValue { object_kind, value_kind, nil } => {
                let object = Term::constant(object_kind, object_of(key)?);
                let value = if nil.as_ref() == Some(value) {
                    Term::nil(value_kind)
                } else {
                    Term::constant(value_kind, value.clone())
                };
                Ok(Literal::new(true, &self.literal, vec![object, value]))
            }
            Interpretation::FromParams { params: names } => {
                let terms = names
                    .iter()
                    .map(|(param, kind)| Ok(Term::constant(kind, params.require(param)?.clone())))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Literal::new(polarity(key, value)?, &self.literal, terms))
            }
            Interpretation::Components { kinds } => {
                let components = value
                    .components()
                    .filter(|components| components.len() == kinds.len())
                    .ok_or_else(|| {
                        SimError::Config(format!(
                            "predicate {} needs {} components, got {}",
                            key,
                            kinds.len(),
                            value
                        ))
                    })?;
                let terms = kinds
                    .iter()
                    .zip(components)
                    .map(|(kind, component)| Term::constant(kind, component))
                    .collect();
                Ok(Literal::new(true, &self.literal, terms))
            }
        }
    }
}

fn polarity(key: &PredicateKey, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| SimError::Config(format!("predicate {} must be boolean, got {}", key, value)))
}

fn object_of(key: &PredicateKey) -> Result<i64> {
    key.object_id()
        .ok_or_else(|| SimError::Config(format!("predicate {} has no object", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TranslationTable {
        TranslationTable::new()
            .name("armEmpty", Translation::new("armEmpty", Interpretation::UnaryObject { object_kind: "obj".into() }))
            .name(
                "objectHeld",
                Translation::new(
                    "objectHeld",
                    Interpretation::ObjectValue {
                        object_kind: "obj".into(),
                        value_kind: "obj".into(),
                        nil: Some(Value::Int(-1)),
                    },
                ),
            )
            .name(
                "pos",
                Translation::new(
                    "pos",
                    Interpretation::ObjectValue { object_kind: "obj".into(), value_kind: "pos".into(), nil: None },
                ),
            )
            .key(
                PredicateKey::object(-1, "pos"),
                Translation::new(
                    "conf",
                    Interpretation::ObjectValue { object_kind: "obj".into(), value_kind: "conf".into(), nil: None },
                ),
            )
            .name(
                "kinPick",
                Translation::new(
                    "kinPick",
                    Interpretation::FromParams { params: vec![("q".into(), "conf".into()), ("p".into(), "pos".into())] },
                ),
            )
    }

    #[test]
    fn test_translate_state() {
        let mut state = State::new();
        state.insert(PredicateKey::object(-1, "armEmpty"), Value::Bool(false));
        state.insert(PredicateKey::object(-1, "objectHeld"), Value::Int(-1));
        state.insert(PredicateKey::object(-1, "pos"), Value::Coord(0, 2));
        state.insert(PredicateKey::object(0, "pos"), Value::Coord(0, 1));
        state.insert(PredicateKey::object(-1, "kinPick"), Value::Bool(true));
        state.insert(PredicateKey::object(0, "color"), Value::Int(3));
        let params = Params::new().with("q", (0, 2)).with("p", (0, 1));

        let text: Vec<String> = table()
            .translate(&state, &params)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            text,
            vec![
                "NOT armEmpty(-1)",
                "kinPick((0, 2), (0, 1))",
                "objectHeld(-1, none)",
                "conf(-1, (0, 2))",
                "pos(0, (0, 1))",
            ]
        );
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let mut state = State::new();
        state.insert(PredicateKey::object(-1, "armEmpty"), Value::Int(1));
        assert!(table().translate(&state, &Params::new()).is_err());
    }

    #[test]
    fn test_table_loads_from_json() {
        let json = r#"{
            "by_name": {
                "movable": { "literal": "movable", "interpretation": { "rule": "unary_object", "object_kind": "obj" } },
                "under": { "literal": "under", "interpretation": { "rule": "components", "kinds": ["conf", "pos"] } }
            }
        }"#;
        let table: TranslationTable = serde_json::from_str(json).unwrap();
        assert!(table.lookup(&PredicateKey::object(3, "movable")).is_some());
        assert!(table.lookup(&PredicateKey::object(3, "pos")).is_none());
    }
}
