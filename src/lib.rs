//! # blocksim - Belief Tracking and Rule Learning in a Blocks World
//!
//! blocksim simulates a discrete blocks-world manipulator under partial
//! observability. It tracks what is known about the world as a set of
//! hypotheses and learns action models (precondition/effect rules) from the
//! transitions it observes.
//!
//! ## Key Features
//!
//! - **Belief States**: disjunctive hypothesis sets with split on demand and
//!   merge-based compaction
//! - **Action Models**: guarded rules with external decision procedures
//! - **Rule Learning**: typed Horn-clause induction with coverage checks and
//!   least-general generalization over term alignments
//! - **Diagnostics**: invariant violations are reported, not fatal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use blocksim::builders::SimulationBuilder;
//! use blocksim::config::Scenario;
//! use blocksim::simulation::Command;
//!
//! let mut sim = SimulationBuilder::new()
//!     .scenario(Scenario::Slippery)
//!     .run_estimator(true)
//!     .build()
//!     .unwrap();
//!
//! sim.step(&Command::Move { q1: (0, 2), q2: (1, 2) }).unwrap();
//! println!("{}", sim.belief());
//! println!("{}", sim.dump_rules());
//! ```
//!
//! ## Module Organization
//!
//! - [`action_model`] - Guards, effects and rule-based actions
//! - [`belief`] - Predicate schema, hypotheses and the state estimator
//! - [`builders`] - Builder patterns for convenient object construction
//! - [`config`] - Simulation configuration and scenario selection
//! - [`diagnostics`] - Invariant-violation reports
//! - [`error`] - Error types and result handling
//! - [`learner`] - Example translation and rule induction
//! - [`logic`] - Terms, literals and clauses
//! - [`scenarios`] - Blocks-world content: initial conditions, action models, learner setup
//! - [`simulation`] - Ground truth, belief and learners driven one command at a time
//! - [`types`] - Values, predicate keys and action parameters

#[macro_use]
pub mod macros;

pub mod action_model;
pub mod belief;
pub mod builders;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod learner;
pub mod logic;
pub mod scenarios;
pub mod simulation;
pub mod types;
