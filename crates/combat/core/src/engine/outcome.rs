use strum::{Display, IntoStaticStr};

use crate::scheduler::TurnQueueEntry;
use crate::state::{Combatant, CombatantId};
use crate::technique::TechniqueId;

/// How an encounter ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Outcome {
    Victory,
    Defeat,
    Fled,
}

/// Engine state machine.
///
/// ```text
/// AdvancingScheduler -> AwaitingPlayerAction -> ResolvingPlayerAction -> CheckingEndConditions
///                    -> AwaitingEnemyAction  -> ResolvingEnemyAction  -> CheckingEndConditions
/// CheckingEndConditions -> AdvancingScheduler | Finished
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatPhase {
    AwaitingPlayerAction,
    ResolvingPlayerAction,
    AdvancingScheduler,
    AwaitingEnemyAction,
    ResolvingEnemyAction,
    CheckingEndConditions,
    Finished(Outcome),
}

impl CombatPhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Finished(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// Final report handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatResult {
    pub outcome: Outcome,
    /// Resolved actions, free actions included.
    pub turns_elapsed: u32,
    pub rounds_completed: u32,
    /// HP removed from enemies by the player.
    pub damage_dealt: u32,
    /// HP the player lost.
    pub damage_taken: u32,
    /// Final combatant state, player first.
    pub combatants: Vec<Combatant>,
}

impl CombatResult {
    pub fn player(&self) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.is_player())
    }
}

/// Everything the presentation layer needs to ask for the player's action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerPrompt {
    pub actor: CombatantId,
    /// The player's own 1-based turn number.
    pub turn: u32,
    /// Upcoming turns after this one.
    pub lookahead: Vec<TurnQueueEntry>,
    pub usable_techniques: Vec<TechniqueId>,
    /// Living enemies.
    pub targets: Vec<CombatantId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    AwaitingPlayer(PlayerPrompt),
    Finished(CombatResult),
}
