use std::collections::BTreeSet;

use thiserror::Error;

use crate::ai::AiLibrary;
use crate::config::BalanceConfig;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{Combatant, CombatantId, Side};
use crate::technique::TechniqueCatalog;

/// Read-only data shared by every encounter.
#[derive(Clone, Copy, Debug)]
pub struct CombatEnv<'a> {
    pub catalog: &'a TechniqueCatalog,
    pub patterns: &'a AiLibrary,
    pub config: &'a BalanceConfig,
}

impl<'a> CombatEnv<'a> {
    pub fn new(catalog: &'a TechniqueCatalog, patterns: &'a AiLibrary, config: &'a BalanceConfig) -> Self {
        Self {
            catalog,
            patterns,
            config,
        }
    }
}

/// Participants and flags for one fight.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encounter {
    pub player: Combatant,
    pub enemies: Vec<Combatant>,
    /// `false` for tutorial/scripted fights: the player never drops below 1 HP.
    #[cfg_attr(feature = "serde", serde(default = "default_can_lose"))]
    pub can_lose: bool,
    /// With `can_lose == false`, reaching 0 HP ends the fight in victory.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scripted_victory: bool,
}

#[cfg(feature = "serde")]
fn default_can_lose() -> bool {
    true
}

impl Encounter {
    pub fn new(player: Combatant, enemies: Vec<Combatant>) -> Self {
        Self {
            player,
            enemies,
            can_lose: true,
            scripted_victory: false,
        }
    }

    pub fn cannot_lose(mut self) -> Self {
        self.can_lose = false;
        self
    }

    pub fn with_scripted_victory(mut self) -> Self {
        self.can_lose = false;
        self.scripted_victory = true;
        self
    }

    /// Checks ids, sides and AI pattern references.
    pub fn validate(&self, patterns: &AiLibrary) -> Result<(), EncounterError> {
        if self.enemies.is_empty() {
            return Err(EncounterError::NoEnemies);
        }
        if self.player.id != CombatantId::PLAYER || self.player.side != Side::Player {
            return Err(EncounterError::InvalidPlayer(self.player.id));
        }
        if self.player.is_defeated() {
            return Err(EncounterError::DefeatedAtStart(self.player.id));
        }

        let mut seen = BTreeSet::from([self.player.id]);
        for enemy in &self.enemies {
            if enemy.side != Side::Enemy {
                return Err(EncounterError::InvalidEnemy(enemy.id));
            }
            if !seen.insert(enemy.id) {
                return Err(EncounterError::DuplicateId(enemy.id));
            }
            if enemy.is_defeated() {
                return Err(EncounterError::DefeatedAtStart(enemy.id));
            }
            if let Some(pattern) = &enemy.ai_pattern {
                if !patterns.contains(pattern) {
                    return Err(EncounterError::UnknownPattern {
                        combatant: enemy.id,
                        pattern: pattern.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncounterError {
    #[error("encounter has no enemies")]
    NoEnemies,

    #[error("player slot holds {0}, which is not the player")]
    InvalidPlayer(CombatantId),

    #[error("{0} is listed as an enemy but fights for the player")]
    InvalidEnemy(CombatantId),

    #[error("combatant id {0} is used more than once")]
    DuplicateId(CombatantId),

    #[error("{0} starts the encounter defeated")]
    DefeatedAtStart(CombatantId),

    #[error("{combatant} uses unknown AI pattern '{pattern}'")]
    UnknownPattern { combatant: CombatantId, pattern: String },
}

impl CombatError for EncounterError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoEnemies => "ENCOUNTER_NO_ENEMIES",
            Self::InvalidPlayer(_) => "ENCOUNTER_INVALID_PLAYER",
            Self::InvalidEnemy(_) => "ENCOUNTER_INVALID_ENEMY",
            Self::DuplicateId(_) => "ENCOUNTER_DUPLICATE_ID",
            Self::DefeatedAtStart(_) => "ENCOUNTER_DEFEATED_AT_START",
            Self::UnknownPattern { .. } => "ENCOUNTER_UNKNOWN_PATTERN",
        }
    }
}
