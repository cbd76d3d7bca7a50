//! Scenario loading

pub mod loader;

pub use loader::{load_scenario, load_scenario_str, ScenarioFile};
