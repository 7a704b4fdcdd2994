pub mod simulation;

pub use simulation::SimulationBuilder;
