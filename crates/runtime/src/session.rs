//! Runs one scenario to completion and reports on it.

use combat_content::ContentBundle;
use combat_core::{CombatEngine, CombatResult, PcgRng};
use serde::Serialize;

use crate::error::{Result, RuntimeError};
use crate::providers::{AutopilotInput, ScenarioInput, ScriptedInput};
use crate::scenario::Scenario;

/// Everything a finished session produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub scenario: String,
    pub seed: u64,
    pub result: CombatResult,
    /// Rendered gameplay log.
    pub log: Vec<String>,
    /// Content and engine diagnostics.
    pub diagnostics: Vec<String>,
    /// Script steps the engine refused.
    pub rejected_steps: Vec<String>,
    /// Hex SHA-256 of the full combat log.
    pub digest: String,
}

impl SessionReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(RuntimeError::Report)
    }
}

pub struct CombatSession<'a> {
    bundle: &'a ContentBundle,
    scenario: &'a Scenario,
    seed: u64,
    autopilot: Option<String>,
}

impl<'a> CombatSession<'a> {
    pub fn new(bundle: &'a ContentBundle, scenario: &'a Scenario, seed: u64) -> Self {
        Self {
            bundle,
            scenario,
            seed,
            autopilot: scenario.autopilot.clone(),
        }
    }

    /// Overrides the scenario's autopilot pattern.
    pub fn with_autopilot(mut self, pattern: impl Into<String>) -> Self {
        self.autopilot = Some(pattern.into());
        self
    }

    pub fn run(&self) -> Result<SessionReport> {
        let encounter = self.scenario.encounter()?;
        let script = ScriptedInput::new(self.scenario.script_steps()?);
        let autopilot = match &self.autopilot {
            Some(id) => {
                let pattern = self
                    .bundle
                    .patterns
                    .get(id)
                    .ok_or_else(|| RuntimeError::UnknownAutopilotPattern(id.clone()))?;
                Some(AutopilotInput::new(pattern, &self.bundle.catalog))
            }
            None => None,
        };
        let mut input = ScenarioInput::new(script, autopilot);

        tracing::info!(scenario = %self.scenario.name, seed = self.seed, "session starting");
        let mut engine = CombatEngine::new(self.bundle.env(), encounter, PcgRng::seeded(self.seed))?;
        let result = engine.run(&mut input)?;
        tracing::info!(
            scenario = %self.scenario.name,
            outcome = %result.outcome,
            turns = result.turns_elapsed,
            "session finished"
        );

        let log = engine.log();
        let diagnostics = self
            .bundle
            .diagnostics
            .iter()
            .cloned()
            .chain(log.diagnostics().map(|entry| entry.render()))
            .collect();

        Ok(SessionReport {
            scenario: self.scenario.name.clone(),
            seed: self.seed,
            log: log.gameplay().map(|entry| entry.render()).collect(),
            diagnostics,
            rejected_steps: input.script.rejections().to_vec(),
            digest: hex::encode(log.digest()),
            result,
        })
    }
}
