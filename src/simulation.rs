//! The non-interactive part of the blocks-world driver.
//!
//! A [`Simulation`] owns a ground-truth estimator (fully observed, always one
//! hypothesis), a belief estimator (partially observed) and one learner per
//! action. Every [`Command`] runs one complete step: both estimators apply the
//! action, the learner sees the ground-truth transition, and the belief
//! estimator is shown what the world reveals.

use std::collections::BTreeMap;
use std::fmt;

use crate::action_model::ActionModel;
use crate::belief::{ActionReport, CompactionReport, ObserveReport, Schema, StateEstimator};
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::learner::{ActionLearner, LearnReport};
use crate::scenarios::{self, ScenarioSpec, ARM};
use crate::types::{Observations, Params, PredicateKey, State};

/// One action invocation
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Move { q1: (i64, i64), q2: (i64, i64) },
    Pick { b: i64, p: (i64, i64), q: (i64, i64) },
    Place { b: i64, p: (i64, i64), q: (i64, i64) },
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::Move { .. } => "move",
            Command::Pick { .. } => "pick",
            Command::Place { .. } => "place",
        }
    }

    pub fn params(&self) -> Params {
        let params = Params::new().with("arm", ARM);
        match *self {
            Command::Move { q1, q2 } => params.with("q1", q1).with("q2", q2),
            Command::Pick { b, p, q } | Command::Place { b, p, q } => params.with("b", b).with("p", p).with("q", q),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { q1, q2 } => write!(f, "move {:?} -> {:?}", q1, q2),
            Command::Pick { b, p, q } => write!(f, "pick {} at {:?} from {:?}", b, p, q),
            Command::Place { b, p, q } => write!(f, "place {} at {:?} from {:?}", b, p, q),
        }
    }
}

/// Everything one step did
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub action: String,
    pub ground_truth: ActionReport,
    pub belief: ActionReport,
    pub learned: LearnReport,
    /// Belief update from the post-step observation; `None` when the belief
    /// estimator is not running
    pub observed: Option<ObserveReport>,
    pub compaction: Option<CompactionReport>,
    /// False if the ground truth ever held more than one hypothesis
    pub ground_truth_consistent: bool,
}

pub struct Simulation {
    config: SimConfig,
    ground_truth: StateEstimator,
    belief: StateEstimator,
    ground_truth_actions: ActionModel,
    belief_actions: ActionModel,
    observed: Vec<PredicateKey>,
    learners: BTreeMap<String, ActionLearner>,
    steps: usize,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        let spec = ScenarioSpec::load(config.scenario);
        let (schema, initial) = Schema::from_initial_conditions(&spec.initial_conditions);

        let mut ground_truth = StateEstimator::new("ground truth", schema.clone()).with_verbose(config.verbose);
        ground_truth.observe(&initial, true)?;

        let mut belief = StateEstimator::new("belief", schema)
            .with_active(config.run_estimator)
            .with_verbose(config.verbose);

        let first = reveal(&ground_truth, &spec.first_observed)?;
        belief.observe(&first, true)?;

        tracing::info!(scenario = ?config.scenario, "simulation ready");
        Ok(Simulation {
            learners: spec.learners(),
            config,
            ground_truth,
            belief,
            ground_truth_actions: spec.ground_truth,
            belief_actions: spec.belief,
            observed: spec.observed,
            steps: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn ground_truth(&self) -> &StateEstimator {
        &self.ground_truth
    }

    pub fn belief(&self) -> &StateEstimator {
        &self.belief
    }

    pub fn learner(&self, action: &str) -> Result<&ActionLearner> {
        self.learners
            .get(action)
            .ok_or_else(|| SimError::UnknownAction(action.to_string()))
    }

    pub fn learners(&self) -> impl Iterator<Item = &ActionLearner> {
        self.learners.values()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// What the world currently reveals about `keys`, read off the ground truth
    pub fn observe_world(&self, keys: &[PredicateKey]) -> Result<Observations> {
        reveal(&self.ground_truth, keys)
    }

    /// The observed predicates of the current ground truth
    pub fn observation(&self) -> Result<State> {
        self.observe_world(&self.observed)
    }

    pub fn step(&mut self, command: &Command) -> Result<StepReport> {
        let action = command.action();
        let params = command.params();
        let kinds = scenarios::param_kinds(action)?;
        tracing::debug!(step = self.steps, command = %command, "step");

        let prev = self.observation()?;
        let ground_truth = self
            .ground_truth
            .apply_action(self.ground_truth_actions.get(action)?, &params)?;
        let belief = self.belief.apply_action(self.belief_actions.get(action)?, &params)?;
        let next = self.observation()?;

        let learner = self
            .learners
            .get_mut(action)
            .ok_or_else(|| SimError::UnknownAction(action.to_string()))?;
        let learned = learner.add_example(&prev, &params, &kinds, &next)?;

        let ground_truth_consistent = self.ground_truth.num_hypotheses() == 1;
        if !ground_truth_consistent {
            tracing::error!(
                hypotheses = self.ground_truth.num_hypotheses(),
                "ground truth has more than one hypothesis"
            );
        }

        let (observed, compaction) = if self.belief.is_active() {
            let observed = self.belief.observe(&next, false)?;
            let compaction = self
                .config
                .compact_after_step
                .then(|| self.belief.hypothesis_removal());
            (Some(observed), compaction)
        } else {
            (None, None)
        };

        self.steps += 1;
        Ok(StepReport {
            action: action.to_string(),
            ground_truth,
            belief,
            learned,
            observed,
            compaction,
            ground_truth_consistent,
        })
    }

    /// Every learner's rule set, rendered
    pub fn dump_rules(&self) -> String {
        self.learners.values().map(|learner| learner.to_string()).collect()
    }
}

fn reveal(ground_truth: &StateEstimator, keys: &[PredicateKey]) -> Result<Observations> {
    let mut observations = Observations::new();
    for key in keys {
        if let Some(value) = ground_truth.certain(key)? {
            observations.insert(key.clone(), value);
        }
    }
    Ok(observations)
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "step {} ({:?})", self.steps, self.config.scenario)?;
        write!(f, "{}", self.ground_truth)?;
        if self.belief.is_active() {
            write!(f, "{}", self.belief)?;
        }
        Ok(())
    }
}
