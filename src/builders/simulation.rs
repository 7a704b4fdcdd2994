use crate::config::{Scenario, SimConfig};
use crate::error::Result;
use crate::simulation::Simulation;

/// Builder for Simulation
pub struct SimulationBuilder {
    config: SimConfig,
    flags: Option<(bool, bool, bool)>,
}

impl SimulationBuilder {
    /// Create a new simulation builder with the default configuration
    pub fn new() -> Self {
        SimulationBuilder {
            config: SimConfig::default(),
            flags: None,
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the scenario
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.config.scenario = scenario;
        self.flags = None;
        self
    }

    /// Select the scenario from one flag per scenario; checked on build
    pub fn scenario_flags(mut self, simple: bool, simple_incomplete: bool, slippery: bool) -> Self {
        self.flags = Some((simple, simple_incomplete, slippery));
        self
    }

    /// Run the belief estimator alongside the ground truth
    pub fn run_estimator(mut self, run: bool) -> Self {
        self.config.run_estimator = run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Compact the belief state after every step
    pub fn compact_after_step(mut self, compact: bool) -> Self {
        self.config.compact_after_step = compact;
        self
    }

    /// Build the simulation
    pub fn build(self) -> Result<Simulation> {
        let mut config = self.config;
        if let Some((simple, simple_incomplete, slippery)) = self.flags {
            config.scenario = Scenario::from_flags(simple, simple_incomplete, slippery)?;
        }
        Simulation::new(config)
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_config() {
        let sim = SimulationBuilder::new()
            .scenario(Scenario::Slippery)
            .run_estimator(true)
            .compact_after_step(false)
            .build()
            .unwrap();
        assert_eq!(sim.config().scenario, Scenario::Slippery);
        assert!(sim.belief().is_active());
        assert!(!sim.config().compact_after_step);
    }

    #[test]
    fn test_conflicting_flags_fail_on_build() {
        assert!(SimulationBuilder::new().scenario_flags(true, true, false).build().is_err());
        let sim = SimulationBuilder::new().scenario_flags(false, true, false).build().unwrap();
        assert_eq!(sim.config().scenario, Scenario::SimpleIncomplete);
    }
}
