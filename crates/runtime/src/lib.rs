//! Headless runner for combat encounters.
//!
//! Loads content and a scenario, drives the player side from a script or an
//! autopilot pattern, and reports the result with its rendered log and
//! digest. The `combat-sim` binary is a thin wrapper around
//! [`CombatSession`].
pub mod config;
pub mod error;
pub mod logging;
pub mod providers;
pub mod scenario;
pub mod session;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use providers::{AutopilotInput, ScenarioInput, ScriptedInput};
pub use scenario::{FighterSpec, Scenario, ScriptStep};
pub use session::{CombatSession, SessionReport};

use combat_content::{ContentBundle, ContentFactory};

/// Content from `config.data_dir`, or the embedded data set.
pub fn load_content(config: &RuntimeConfig) -> Result<ContentBundle> {
    let bundle = match &config.data_dir {
        Some(dir) => ContentFactory::new(dir).load_bundle(),
        None => ContentBundle::embedded(),
    };
    bundle.map_err(RuntimeError::Content)
}

/// Scenario from `config.scenario`, or the built-in training yard.
pub fn load_scenario(config: &RuntimeConfig) -> Result<Scenario> {
    match &config.scenario {
        Some(path) => Scenario::load(path),
        None => Scenario::training_yard(),
    }
}
