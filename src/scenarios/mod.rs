//! # Blocks-world scenarios
//!
//! The content the core runs on: initial conditions (and with them the
//! predicate schema), the action models of the ground-truth and belief
//! estimators, which predicates the world reveals, and the learner setup.
//!
//! | Scenario | Ground truth | Belief model |
//! |---|---|---|
//! | `Simple` | full model | full model |
//! | `SimpleIncomplete` | full model | without the mobility-coupling rules |
//! | `Slippery` | slippery blocks cannot be picked | same as ground truth |

pub mod blocks;

pub use blocks::{KinMove, KinMovePred, KinPick, KinPickPred, Safe, SafePred, UnderPred};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::action_model::{ActionModel, ActionRule, ActionRuleBased, Effect, Guard};
use crate::belief::InitialCondition;
use crate::config::Scenario;
use crate::error::{Result, SimError};
use crate::learner::{ActionLearner, Interpretation, Translation, TranslationTable};
use crate::types::{ParamKinds, PredicateKey, PredicateKind, Value};

/// Object index of the arm
pub const ARM: i64 = -1;

/// Everything a simulation needs to know about one scenario
pub struct ScenarioSpec {
    pub scenario: Scenario,
    pub initial_conditions: Vec<InitialCondition>,
    pub ground_truth: ActionModel,
    pub belief: ActionModel,
    /// Predicates the world reveals after every step
    pub observed: Vec<PredicateKey>,
    /// Predicates revealed before the first step
    pub first_observed: Vec<PredicateKey>,
}

impl ScenarioSpec {
    pub fn load(scenario: Scenario) -> Self {
        let slippery = scenario == Scenario::Slippery;
        let full = action_model(slippery, true);
        let belief = match scenario {
            Scenario::SimpleIncomplete => action_model(false, false),
            _ => action_model(slippery, true),
        };
        let initial_conditions = initial_conditions(slippery);
        let positions: Vec<PredicateKey> = initial_conditions
            .iter()
            .filter(|c| c.key.name == "pos")
            .map(|c| c.key.clone())
            .collect();

        let mut first_observed = positions.clone();
        first_observed.push(PredicateKey::object(ARM, "objectHeld"));
        let mut observed = positions;
        observed.extend(["armEmpty", "objectHeld", "movable"].map(|name| PredicateKey::object(ARM, name)));

        ScenarioSpec {
            scenario,
            initial_conditions,
            ground_truth: full,
            belief,
            observed,
            first_observed,
        }
    }

    /// One learner per action
    pub fn learners(&self) -> BTreeMap<String, ActionLearner> {
        let table = translation_table();
        [
            ActionLearner::new("move", table.clone())
                .with_derived(Arc::new(KinMovePred))
                .with_derived(Arc::new(UnderPred)),
            ActionLearner::new("pick", table.clone()).with_derived(Arc::new(KinPickPred)),
            ActionLearner::new("place", table).with_derived(Arc::new(SafePred)),
        ]
        .into_iter()
        .map(|learner| (learner.name().to_string(), learner))
        .collect()
    }
}

/// Declared term kinds of an action's parameters
pub fn param_kinds(action: &str) -> Result<ParamKinds> {
    let kinds: &[(&str, &str)] = match action {
        "move" => &[("arm", "obj"), ("q1", "conf"), ("q2", "conf")],
        "pick" | "place" => &[("arm", "obj"), ("b", "obj"), ("p", "pos"), ("q", "conf")],
        _ => return Err(SimError::UnknownAction(action.to_string())),
    };
    Ok(kinds
        .iter()
        .map(|(name, kind)| (name.to_string(), kind.to_string()))
        .collect())
}

fn initial_conditions(slippery: bool) -> Vec<InitialCondition> {
    use PredicateKind::{Bool, Cat};
    let at = |object: i64, name: &str| PredicateKey::object(object, name);

    let mut conditions = vec![
        InitialCondition::new(at(ARM, "armEmpty"), Bool, true),
        InitialCondition::new(at(ARM, "movable"), Bool, true),
        InitialCondition::new(at(ARM, "pos"), Cat, (0, 2)),
        InitialCondition::new(at(ARM, "objectHeld"), Cat, -1),
    ];
    // block 0 sits on the immovable block 1; block 2 stands alone
    let blocks = [(0, (0, 1), true, false), (1, (0, 0), false, false), (2, (3, 0), true, true)];
    for (block, pos, movable, is_slippery) in blocks {
        conditions.push(InitialCondition::new(at(block, "movable"), Bool, movable));
        if slippery {
            conditions.push(InitialCondition::new(at(block, "slippery"), Bool, is_slippery));
        }
        conditions.push(InitialCondition::new(at(block, "pos"), Cat, pos));
    }
    conditions
}

/// The blocks-world action model. `slippery` adds the slippery guard to
/// picking; `coupled` includes the rules that tie the arm's mobility to an
/// immovable block in hand.
fn action_model(slippery: bool, coupled: bool) -> ActionModel {
    let kin_pick = Arc::new(KinPick);
    let kin_move = Arc::new(KinMove);
    let safe = Arc::new(Safe);

    let mut pick_guards = vec![Guard::state("arm", "armEmpty", true)];
    if slippery {
        pick_guards.push(Guard::state("b", "slippery", false));
    }
    pick_guards.extend([
        Guard::param("arm", "pos", "q"),
        Guard::param("b", "pos", "p"),
        Guard::function(kin_pick, true),
    ]);
    let mut pick = vec![ActionRule::new(
        pick_guards.clone(),
        vec![Effect::value("arm", "armEmpty", false), Effect::param("arm", "objectHeld", "b")],
    )];

    let move_guards = vec![
        Guard::state("arm", "movable", true),
        Guard::param("arm", "pos", "q1"),
        Guard::function(kin_move, true),
    ];
    let mut carried = move_guards.clone();
    carried.push(Guard::state("arm", "armEmpty", false));
    let moves = vec![
        ActionRule::new(move_guards, vec![Effect::param("arm", "pos", "q2")]),
        ActionRule::new(carried, vec![Effect::param("obj_held", "pos", "obj_held_p2")]),
    ];

    let place_guards = vec![
        Guard::state("arm", "armEmpty", false),
        Guard::param("arm", "objectHeld", "b"),
        Guard::param("arm", "pos", "q"),
        Guard::param("b", "pos", "p"),
        Guard::function(safe, true),
    ];
    let mut place = vec![ActionRule::new(
        place_guards.clone(),
        vec![Effect::value("arm", "armEmpty", true), Effect::value("arm", "objectHeld", -1)],
    )];

    if coupled {
        let mut stuck = pick_guards;
        stuck.push(Guard::state("b", "movable", false));
        pick.push(ActionRule::new(stuck, vec![Effect::value("arm", "movable", false)]));

        let mut released = place_guards;
        released.push(Guard::state("b", "movable", false));
        place.push(ActionRule::new(released, vec![Effect::value("arm", "movable", true)]));
    }

    ActionModel::new()
        .with(ActionRuleBased::new("move", moves))
        .with(ActionRuleBased::new("pick", pick))
        .with(ActionRuleBased::new("place", place))
}

/// How observed predicates become literals for the learners
pub fn translation_table() -> TranslationTable {
    let unary = |name: &str| Translation::new(name, Interpretation::UnaryObject { object_kind: "obj".into() });
    let object_value = |name: &str, kind: &str, nil: Option<Value>| {
        Translation::new(
            name,
            Interpretation::ObjectValue {
                object_kind: "obj".into(),
                value_kind: kind.into(),
                nil,
            },
        )
    };
    let from_params = |name: &str, params: &[(&str, &str)]| {
        Translation::new(
            name,
            Interpretation::FromParams {
                params: params.iter().map(|(p, k)| (p.to_string(), k.to_string())).collect(),
            },
        )
    };

    TranslationTable::new()
        .name("armEmpty", unary("armEmpty"))
        .name("movable", unary("movable"))
        .name("pos", object_value("pos", "pos", None))
        .key(PredicateKey::object(ARM, "pos"), object_value("conf", "conf", None))
        .name("objectHeld", object_value("objectHeld", "obj", Some(Value::Int(-1))))
        .name("safe", from_params("safe", &[("p", "pos")]))
        .name("kinMove", from_params("kinMove", &[("q1", "conf"), ("q2", "conf")]))
        .name("kinPick", from_params("kinPick", &[("q", "conf"), ("p", "pos")]))
        .name(
            "under",
            Translation::new(
                "under",
                Interpretation::Components {
                    kinds: vec!["conf".into(), "pos".into()],
                },
            ),
        )
}
