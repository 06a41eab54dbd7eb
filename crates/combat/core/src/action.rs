//! Actions a combatant can take on its turn.

use crate::state::{CombatantId, Stance};
use crate::technique::TechniqueId;

/// One action chosen by the player or an AI pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum CombatAction {
    BasicAttack {
        target: CombatantId,
    },
    /// `target` is ignored by techniques that only affect the user.
    Technique {
        id: TechniqueId,
        target: CombatantId,
    },
    ChangeStance(Stance),
    Defend,
    Flee,
}

impl CombatAction {
    pub fn technique(id: impl Into<TechniqueId>, target: CombatantId) -> Self {
        Self::Technique { id: id.into(), target }
    }

    pub fn target(&self) -> Option<CombatantId> {
        match self {
            Self::BasicAttack { target } | Self::Technique { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::BasicAttack { .. } => "basic-attack".to_string(),
            Self::Technique { id, .. } => format!("use:{id}"),
            Self::ChangeStance(stance) => format!("stance:{stance}"),
            Self::Defend => "defend".to_string(),
            Self::Flee => "flee".to_string(),
        }
    }
}

/// What a combatant did on its last turn, kept for AI conditions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ActionMarker {
    BasicAttack,
    Technique { id: TechniqueId, heavy: bool },
    StanceChange,
    Defend,
    Flee,
}
