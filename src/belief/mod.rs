//! # Belief States Module
//!
//! Tracks what is known about a partially observed discrete world. A belief
//! state is a disjunctive set of hypotheses, each an assignment of values (or
//! unknown) to every slot of a fixed predicate schema.
//!
//! ## Core Concepts
//!
//! - **Schema**: ordered boolean predicates followed by categorical ones
//! - **Hypothesis**: one candidate assignment over the schema
//! - **Split**: an action whose guards need an unknown boolean predicate
//!   replaces the hypothesis by one copy per truth assignment
//! - **Compaction**: hypotheses differing in exactly one boolean slot merge back
//!   into one with that slot unknown
//! - **Core**: slots every hypothesis agrees on
//!
//! A ground-truth estimator is fed complete observations and always holds
//! exactly one hypothesis; a belief estimator sees partial observations and
//! holds one or more.

pub mod estimator;
pub mod hypothesis;

pub use estimator::{ActionReport, CompactionReport, ObserveReport, PassReport, StateEstimator};
pub use hypothesis::{Hypothesis, HypothesisView, InitialCondition, Schema};
