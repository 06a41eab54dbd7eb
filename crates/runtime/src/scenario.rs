//! Scenario files: who fights, and how the player side is driven.
//!
//! ```ron
//! (
//!     name: "Training Yard",
//!     player: (name: "Mei", stats: (strength: 12, endurance: 10, dexterity: 14, wisdom: 10),
//!              techniques: ["swift-palm", "river-step"]),
//!     enemies: [(name: "Bandit", hp: 60, pattern: Some("bandit"))],
//!     script: ["use:swift-palm", "use:river-step@1", "defend"],
//! )
//! ```
//!
//! Enemy ids default to their position (1-based). Script steps use the AI
//! action grammar plus `flee`; `@<id>` picks a target, otherwise the first
//! living enemy is attacked.

use std::path::Path;

use combat_core::{BaseStats, Combatant, CombatantId, Encounter, RuleAction, Stance, StatusEffect};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};

const TRAINING_YARD: &str = include_str!("../scenarios/training_yard.ron");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub player: FighterSpec,
    pub enemies: Vec<FighterSpec>,
    #[serde(default = "default_can_lose")]
    pub can_lose: bool,
    #[serde(default)]
    pub scripted_victory: bool,
    /// Player actions in order.
    #[serde(default)]
    pub script: Vec<String>,
    /// AI pattern that plays the player once the script runs out.
    #[serde(default)]
    pub autopilot: Option<String>,
}

fn default_can_lose() -> bool {
    true
}

/// One combatant as written in a scenario file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSpec {
    /// Enemy slot id; ignored for the player.
    #[serde(default)]
    pub id: Option<u8>,
    pub name: String,
    #[serde(default)]
    pub stats: BaseStats,
    #[serde(default = "default_hp")]
    pub hp: u32,
    #[serde(default = "default_chi")]
    pub chi: u32,
    #[serde(default)]
    pub stance: Stance,
    #[serde(default)]
    pub techniques: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// Effects active when the fight starts.
    #[serde(default)]
    pub effects: Vec<StatusEffect>,
}

fn default_hp() -> u32 {
    100
}

fn default_chi() -> u32 {
    50
}

impl FighterSpec {
    fn dress(&self, combatant: Combatant) -> Combatant {
        let mut combatant = combatant
            .with_hp(self.hp, self.hp)
            .with_chi(self.chi, self.chi)
            .with_stance(self.stance)
            .with_techniques(self.techniques.iter().map(String::as_str));
        if let Some(pattern) = &self.pattern {
            combatant = combatant.with_pattern(pattern.as_str());
        }
        for effect in &self.effects {
            combatant = combatant.with_effect(effect.clone());
        }
        combatant
    }
}

/// A parsed script step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptStep {
    Act {
        action: RuleAction,
        target: Option<CombatantId>,
    },
    Flee,
}

impl ScriptStep {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |reason: String| RuntimeError::InvalidScriptStep {
            step: text.to_string(),
            reason,
        };

        let (action, target) = match text.split_once('@') {
            Some((action, target)) => {
                let id = target
                    .trim()
                    .parse::<u8>()
                    .map_err(|_| invalid(format!("'{}' is not a combatant id", target.trim())))?;
                (action, Some(CombatantId(id)))
            }
            None => (text, None),
        };

        if action.trim().eq_ignore_ascii_case("flee") {
            return Ok(Self::Flee);
        }
        let action = RuleAction::parse(action).map_err(|err| invalid(err.to_string()))?;
        Ok(Self::Act { action, target })
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| RuntimeError::ScenarioIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(RuntimeError::ScenarioParse)
    }

    /// The scenario bundled with the simulator.
    pub fn training_yard() -> Result<Self> {
        Self::parse(TRAINING_YARD)
    }

    pub fn encounter(&self) -> Result<Encounter> {
        let player = self
            .player
            .dress(Combatant::player(self.player.name.as_str(), self.player.stats));

        let mut enemies = Vec::with_capacity(self.enemies.len());
        for (index, spec) in self.enemies.iter().enumerate() {
            let id = match spec.id {
                Some(0) => return Err(RuntimeError::ReservedEnemyId(0)),
                Some(id) => id,
                None => u8::try_from(index + 1).map_err(|_| RuntimeError::TooManyEnemies(self.enemies.len()))?,
            };
            enemies.push(spec.dress(Combatant::enemy(id, spec.name.as_str(), spec.stats)));
        }

        let mut encounter = Encounter::new(player, enemies);
        if !self.can_lose {
            encounter = encounter.cannot_lose();
        }
        if self.scripted_victory {
            encounter = encounter.with_scripted_victory();
        }
        Ok(encounter)
    }

    pub fn script_steps(&self) -> Result<Vec<ScriptStep>> {
        self.script.iter().map(|step| ScriptStep::parse(step)).collect()
    }
}
