//! Decision procedures and derived predicates of the blocks world.
//!
//! The world is a grid `0 <= x < 9`, `0 <= y <= 3`. Object `-1` is the arm;
//! its `pos` is its configuration, one cell above whatever it holds.

use crate::action_model::{Decision, DecisionFn};
use crate::belief::{HypothesisView, Schema};
use crate::error::{Result, SimError};
use crate::learner::DerivedPredicates;
use crate::types::{Params, PredicateKey, State, Value};

pub const WIDTH: i64 = 9;
pub const MAX_HEIGHT: i64 = 3;

const DIRECTIONS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

fn coord(params: &Params, name: &str) -> Result<(i64, i64)> {
    let value = params.require(name)?;
    value
        .as_coord()
        .ok_or_else(|| SimError::invalid_parameter(name.to_string(), format!("expected a coordinate, got {}", value)))
}

fn within_walls((x, y): (i64, i64)) -> bool {
    (0..WIDTH).contains(&x) && (0..=MAX_HEIGHT).contains(&y)
}

fn unknown_positions(hyp: &HypothesisView<'_>) -> Vec<PredicateKey> {
    hyp.named("pos")
        .filter(|(_, cell)| cell.is_unknown())
        .map(|(key, _)| key.clone())
        .collect()
}

/// The arm hovers directly above the block to pick
pub struct KinPick;

impl DecisionFn for KinPick {
    fn name(&self) -> &str {
        "KinPick"
    }

    fn decide(&self, params: &Params, _hyp: &HypothesisView<'_>) -> Result<Decision> {
        let (q, p) = (coord(params, "q")?, coord(params, "p")?);
        Ok((q.0 - p.0 == 0 && q.1 - p.1 == 1).into())
    }

    fn required_unknowns(&self, _params: &Params, _hyp: &HypothesisView<'_>) -> Result<Vec<PredicateKey>> {
        Ok(Vec::new())
    }
}

/// One-cell translation of the arm, and of the held object below it, into
/// free cells inside the walls.
///
/// When the arm holds something the decision binds `obj_held` and
/// `obj_held_p2` (its destination) for the rule's effects.
pub struct KinMove;

impl DecisionFn for KinMove {
    fn name(&self) -> &str {
        "KinMove"
    }

    fn decide(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Decision> {
        let arm = params.object("arm")?;
        let (q1, q2) = (coord(params, "q1")?, coord(params, "q2")?);
        if !DIRECTIONS.contains(&(q2.0 - q1.0, q2.1 - q1.1)) {
            return Ok(false.into());
        }

        let empty = hyp.get(&PredicateKey::object(arm, "armEmpty"))?;
        let holding = empty.value().and_then(Value::as_bool) == Some(false);
        let mut destinations = vec![q2];
        let mut decision = Decision::from(true);
        let mut held = None;
        if holding {
            let Some(object) = hyp
                .get(&PredicateKey::object(arm, "objectHeld"))?
                .value()
                .and_then(Value::as_int)
            else {
                tracing::debug!(arm, "held object unknown, move undecidable");
                return Ok(false.into());
            };
            let below = (q2.0, q2.1 - 1);
            destinations.push(below);
            decision = decision.bind("obj_held", object).bind("obj_held_p2", below);
            held = Some(object);
        }

        for (key, cell) in hyp.named("pos") {
            let object = key.object_id();
            if object == Some(arm) || (held.is_some() && object == held) {
                continue;
            }
            if let Some(at) = cell.value().and_then(Value::as_coord) {
                if destinations.contains(&at) {
                    return Ok(false.into());
                }
            }
        }

        if !destinations.iter().all(|&at| within_walls(at)) {
            return Ok(false.into());
        }
        Ok(decision)
    }

    fn required_unknowns(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Vec<PredicateKey>> {
        let arm = params.object("arm")?;
        let mut missing = unknown_positions(hyp);
        for name in ["armEmpty", "objectHeld"] {
            let key = PredicateKey::object(arm, name);
            if hyp.get(&key)?.is_unknown() {
                missing.push(key);
            }
        }
        Ok(missing)
    }
}

/// The placed block rests on the floor or on another object
pub struct Safe;

impl DecisionFn for Safe {
    fn name(&self) -> &str {
        "Safe"
    }

    fn decide(&self, params: &Params, hyp: &HypothesisView<'_>) -> Result<Decision> {
        let p = coord(params, "p")?;
        let block = params.object("b")?;
        if !(0..WIDTH).contains(&p.0) {
            return Ok(false.into());
        }
        if p.1 == 0 {
            return Ok(true.into());
        }
        let mut supported = false;
        for (key, cell) in hyp.named("pos") {
            let Some(at) = cell.value().and_then(Value::as_coord) else {
                continue;
            };
            if at == p && key.object_id() != Some(block) {
                return Ok(false.into());
            }
            if at == (p.0, p.1 - 1) {
                supported = true;
            }
        }
        Ok(supported.into())
    }

    fn required_unknowns(&self, _params: &Params, hyp: &HypothesisView<'_>) -> Result<Vec<PredicateKey>> {
        Ok(unknown_positions(hyp))
    }
}

/// Run a decision procedure on a plain state and record its verdict as
/// `arm.<name>`
fn decided(func: &dyn DecisionFn, name: &str, params: &Params, state: &State) -> Result<Vec<(PredicateKey, Value)>> {
    let arm = params.object("arm")?;
    let (schema, hyp) = Schema::snapshot(state);
    let decision = func.decide(params, &HypothesisView::new(&schema, &hyp))?;
    Ok(vec![(PredicateKey::object(arm, name), Value::Bool(decision.holds))])
}

/// `arm.kinPick`: whether the pick is kinematically feasible
pub struct KinPickPred;

impl DerivedPredicates for KinPickPred {
    fn name(&self) -> &str {
        "kinPick"
    }

    fn derive(&self, params: &Params, state: &State) -> Result<Vec<(PredicateKey, Value)>> {
        decided(&KinPick, "kinPick", params, state)
    }
}

/// `arm.kinMove`: whether the move is kinematically feasible
pub struct KinMovePred;

impl DerivedPredicates for KinMovePred {
    fn name(&self) -> &str {
        "kinMove"
    }

    fn derive(&self, params: &Params, state: &State) -> Result<Vec<(PredicateKey, Value)>> {
        decided(&KinMove, "kinMove", params, state)
    }
}

/// `arm.safe`: whether the place target is supported
pub struct SafePred;

impl DerivedPredicates for SafePred {
    fn name(&self) -> &str {
        "safe"
    }

    fn derive(&self, params: &Params, state: &State) -> Result<Vec<(PredicateKey, Value)>> {
        decided(&Safe, "safe", params, state)
    }
}

/// `arm.under`: the destination configuration of a move paired with the cell
/// right below it, linking the move to whatever occupies that cell
pub struct UnderPred;

impl DerivedPredicates for UnderPred {
    fn name(&self) -> &str {
        "under"
    }

    fn derive(&self, params: &Params, _state: &State) -> Result<Vec<(PredicateKey, Value)>> {
        let arm = params.object("arm")?;
        let q2 = coord(params, "q2")?;
        let below = Value::Coord(q2.0, q2.1 - 1);
        Ok(vec![(
            PredicateKey::object(arm, "under"),
            Value::Tuple(vec![q2.into(), below]),
        )])
    }
}
