//! Simulation configuration.
//!
//! A [`SimConfig`] is built once (in code, through
//! [`crate::builders::SimulationBuilder`], or from JSON) and handed to the
//! simulation's constructor. Exactly one [`Scenario`] is selected.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SimError};

/// Which blocks-world content the simulation loads
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Full action model for both estimators
    #[default]
    Simple,
    /// The belief estimator runs without the rules coupling block and arm mobility
    SimpleIncomplete,
    /// Some blocks are slippery and cannot be picked
    Slippery,
}

impl Scenario {
    /// Select a scenario from one-flag-per-scenario input; exactly one flag
    /// must be set
    pub fn from_flags(simple: bool, simple_incomplete: bool, slippery: bool) -> Result<Self> {
        match (simple, simple_incomplete, slippery) {
            (true, false, false) => Ok(Scenario::Simple),
            (false, true, false) => Ok(Scenario::SimpleIncomplete),
            (false, false, true) => Ok(Scenario::Slippery),
            _ => Err(SimError::Config(
                "exactly one scenario must be selected".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub scenario: Scenario,
    /// Whether the belief estimator tracks actions and observations
    pub run_estimator: bool,
    /// Per-hypothesis logging from the estimators
    pub verbose: bool,
    /// Run compaction on the belief state after every step
    pub compact_after_step: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            scenario: Scenario::Simple,
            run_estimator: false,
            verbose: false,
            compact_after_step: true,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
