use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimError};

/// A value a predicate slot can hold
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Coord(i64, i64),
    Tuple(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_coord(&self) -> Option<(i64, i64)> {
        match self {
            Value::Coord(x, y) => Some((*x, *y)),
            _ => None,
        }
    }

    /// Components of a compound value; coordinates split into their two integers
    pub fn components(&self) -> Option<Vec<Value>> {
        match self {
            Value::Coord(x, y) => Some(vec![Value::Int(*x), Value::Int(*y)]),
            Value::Tuple(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<(i64, i64)> for Value {
    fn from((x, y): (i64, i64)) -> Self {
        Value::Coord(x, y)
    }
}

impl From<(i32, i32)> for Value {
    fn from((x, y): (i32, i32)) -> Self {
        Value::Coord(x as i64, y as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Coord(x, y) => write!(f, "({}, {})", x, y),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One slot of a hypothesis: either a known value or unknown.
///
/// Unknown never compares equal to anything, another unknown included; use
/// [`Cell::compare`] rather than `==` whenever that matters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Unknown,
    Known(Value),
}

/// Result of comparing two cells under three-valued equality
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Differ,
    Undecided,
}

impl Cell {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Cell::Unknown)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Cell::Known(v) => Some(v),
            Cell::Unknown => None,
        }
    }

    /// True only when the cell is known and holds `value`
    pub fn holds(&self, value: &Value) -> bool {
        self.value() == Some(value)
    }

    pub fn compare(&self, other: &Cell) -> Comparison {
        match (self, other) {
            (Cell::Known(a), Cell::Known(b)) if a == b => Comparison::Equal,
            (Cell::Known(_), Cell::Known(_)) => Comparison::Differ,
            _ => Comparison::Undecided,
        }
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        Cell::Known(v)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Unknown => write!(f, "?"),
            Cell::Known(v) => write!(f, "{}", v),
        }
    }
}

/// Which object a predicate talks about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    Global,
    Object(i64),
}

/// Identifies one slot of the predicate schema, printed as `object.name`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PredicateKey {
    pub scope: Scope,
    pub name: String,
}

impl PredicateKey {
    pub fn object(object: i64, name: impl Into<String>) -> Self {
        PredicateKey {
            scope: Scope::Object(object),
            name: name.into(),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        PredicateKey {
            scope: Scope::Global,
            name: name.into(),
        }
    }

    pub fn object_id(&self) -> Option<i64> {
        match self.scope {
            Scope::Object(id) => Some(id),
            Scope::Global => None,
        }
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Object(id) => write!(f, "{}.{}", id, self.name),
            Scope::Global => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for PredicateKey {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((object, name)) => {
                let id = object
                    .parse::<i64>()
                    .map_err(|_| SimError::InvalidKey(s.to_string()))?;
                if name.is_empty() {
                    return Err(SimError::InvalidKey(s.to_string()));
                }
                Ok(PredicateKey::object(id, name))
            }
            None if !s.is_empty() => Ok(PredicateKey::global(s)),
            None => Err(SimError::InvalidKey(s.to_string())),
        }
    }
}

impl TryFrom<String> for PredicateKey {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PredicateKey> for String {
    fn from(key: PredicateKey) -> Self {
        key.to_string()
    }
}

/// Declared kind of a schema slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredicateKind {
    Bool,
    Cat,
}

/// A fully observed world state, ordered by predicate key
pub type State = BTreeMap<PredicateKey, Value>;

/// Observations handed to an estimator
pub type Observations = BTreeMap<PredicateKey, Value>;

/// Declared term kind of every action parameter (`obj`, `pos`, `conf`, ...)
pub type ParamKinds = BTreeMap<String, String>;

/// Bound action arguments
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    values: BTreeMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Look up a parameter, failing if the action was invoked without it
    pub fn require(&self, name: &str) -> Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| SimError::MissingParameter {
                param: name.to_string(),
            })
    }

    /// Resolve a parameter that names an object index
    pub fn object(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value.as_int().ok_or_else(|| SimError::NotAnObject {
            param: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Params {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let key: PredicateKey = "-1.armEmpty".parse().unwrap();
        assert_eq!(key, PredicateKey::object(-1, "armEmpty"));
        assert_eq!(key.to_string(), "-1.armEmpty");

        let global: PredicateKey = "gravity".parse().unwrap();
        assert_eq!(global.scope, Scope::Global);

        assert!("x.pos".parse::<PredicateKey>().is_err());
        assert!("0.".parse::<PredicateKey>().is_err());
    }

    #[test]
    fn test_unknown_is_never_equal() {
        let known = Cell::Known(Value::Bool(true));
        assert_eq!(known.compare(&Cell::Known(Value::Bool(true))), Comparison::Equal);
        assert_eq!(known.compare(&Cell::Known(Value::Bool(false))), Comparison::Differ);
        assert_eq!(Cell::Unknown.compare(&Cell::Unknown), Comparison::Undecided);
        assert_eq!(known.compare(&Cell::Unknown), Comparison::Undecided);
        assert!(!Cell::Unknown.holds(&Value::Bool(false)));
    }

    #[test]
    fn test_value_json_forms() {
        let values: Vec<Value> = serde_json::from_str("[true, 3, [0, 1], [[0, 2], [0, 1]]]").unwrap();
        assert_eq!(values[0], Value::Bool(true));
        assert_eq!(values[1], Value::Int(3));
        assert_eq!(values[2], Value::Coord(0, 1));
        assert_eq!(
            values[3],
            Value::Tuple(vec![Value::Coord(0, 2), Value::Coord(0, 1)])
        );
    }

    #[test]
    fn test_params_object() {
        let params = Params::new().with("arm", -1).with("p", (0, 1));
        assert_eq!(params.object("arm").unwrap(), -1);
        assert!(params.object("p").is_err());
        assert!(params.require("q").is_err());
    }
}
