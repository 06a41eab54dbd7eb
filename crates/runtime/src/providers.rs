//! Player input providers for unattended runs.
//!
//! [`ScriptedInput`] replays scenario steps in order, [`AutopilotInput`]
//! lets an AI pattern play the player, and [`ScenarioInput`] chains the two.

use std::collections::VecDeque;

use combat_core::{
    ActionRejected, AiDecisionEngine, AiPattern, AiView, CombatAction, Combatant, CombatantId, PlayerInput,
    PlayerPrompt, RuleAction, TechniqueCatalog,
};

use crate::scenario::ScriptStep;

/// Replays a fixed list of steps. Rejected steps are skipped.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    steps: VecDeque<ScriptStep>,
    rejections: Vec<String>,
}

impl ScriptedInput {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            rejections: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Reasons for every refused step, in order.
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }
}

impl PlayerInput for ScriptedInput {
    fn choose(&mut self, prompt: &PlayerPrompt, _combatants: &[Combatant]) -> Option<CombatAction> {
        let step = self.steps.pop_front()?;
        Some(step_to_action(step, prompt))
    }

    fn rejected(&mut self, reason: &ActionRejected) {
        tracing::warn!(%reason, "scripted step rejected");
        self.rejections.push(reason.to_string());
    }
}

fn step_to_action(step: ScriptStep, prompt: &PlayerPrompt) -> CombatAction {
    match step {
        ScriptStep::Flee => CombatAction::Flee,
        ScriptStep::Act { action, target } => {
            let target = target
                .or_else(|| prompt.targets.first().copied())
                .unwrap_or(CombatantId::PLAYER);
            match action {
                RuleAction::UseTechnique(id) => CombatAction::Technique { id, target },
                RuleAction::BasicAttack => CombatAction::BasicAttack { target },
                RuleAction::Defend => CombatAction::Defend,
                RuleAction::ChangeStance(stance) => CombatAction::ChangeStance(stance),
            }
        }
    }
}

/// Plays the player with an AI pattern against the first living enemy.
///
/// After a refused decision the next choice is a plain basic attack, so a
/// pattern that keeps picking unusable actions cannot stall the fight.
#[derive(Clone, Debug)]
pub struct AutopilotInput<'a> {
    pattern: &'a AiPattern,
    catalog: &'a TechniqueCatalog,
    fall_back: bool,
}

impl<'a> AutopilotInput<'a> {
    pub fn new(pattern: &'a AiPattern, catalog: &'a TechniqueCatalog) -> Self {
        Self {
            pattern,
            catalog,
            fall_back: false,
        }
    }
}

impl PlayerInput for AutopilotInput<'_> {
    fn choose(&mut self, prompt: &PlayerPrompt, combatants: &[Combatant]) -> Option<CombatAction> {
        let target = *prompt.targets.first()?;
        if std::mem::take(&mut self.fall_back) {
            return Some(CombatAction::BasicAttack { target });
        }

        let me = combatants.iter().find(|c| c.id == prompt.actor)?;
        let opponent = combatants.iter().find(|c| c.id == target)?;
        let view = AiView {
            me,
            opponent,
            turn: prompt.turn,
        };
        let decision = AiDecisionEngine::decide(self.pattern, &view, self.catalog);
        for diagnostic in &decision.diagnostics {
            tracing::warn!(pattern = %self.pattern.id, "{diagnostic}");
        }
        Some(decision.action)
    }

    fn rejected(&mut self, reason: &ActionRejected) {
        tracing::debug!(pattern = %self.pattern.id, %reason, "autopilot decision rejected");
        self.fall_back = true;
    }
}

/// Script first, then autopilot (if any).
#[derive(Clone, Debug)]
pub struct ScenarioInput<'a> {
    pub script: ScriptedInput,
    pub autopilot: Option<AutopilotInput<'a>>,
    on_script: bool,
}

impl<'a> ScenarioInput<'a> {
    pub fn new(script: ScriptedInput, autopilot: Option<AutopilotInput<'a>>) -> Self {
        Self {
            script,
            autopilot,
            on_script: false,
        }
    }
}

impl PlayerInput for ScenarioInput<'_> {
    fn choose(&mut self, prompt: &PlayerPrompt, combatants: &[Combatant]) -> Option<CombatAction> {
        if let Some(action) = self.script.choose(prompt, combatants) {
            self.on_script = true;
            return Some(action);
        }
        self.on_script = false;
        self.autopilot.as_mut()?.choose(prompt, combatants)
    }

    fn rejected(&mut self, reason: &ActionRejected) {
        if self.on_script {
            self.script.rejected(reason);
        } else if let Some(autopilot) = self.autopilot.as_mut() {
            autopilot.rejected(reason);
        }
    }
}
