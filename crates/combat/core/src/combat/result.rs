use crate::action::ActionMarker;
use crate::combo::ComboState;
use crate::log::LogEntry;
use crate::state::{CombatantId, Stance, StatusEffect};
use crate::technique::SpeedTier;

/// One state change produced by the resolver and applied by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    SpendChi { who: CombatantId, amount: u32 },
    Damage { target: CombatantId, amount: u32, critical: bool },
    Heal { target: CombatantId, amount: u32 },
    /// Moves up to `amount` chi; the receiver keeps only what fits.
    TransferChi { from: CombatantId, to: CombatantId, amount: u32 },
    ApplyStatus { target: CombatantId, effect: StatusEffect },
    ClearStatuses { target: CombatantId },
    SetDefending { target: CombatantId },
    Stagger { target: CombatantId },
    PrimeCrit { target: CombatantId },
    ConsumeCrit { target: CombatantId },
    ChangeStance { target: CombatantId, stance: Stance },
    Flee { succeeded: bool },
}

/// Outcome of resolving one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult {
    pub actor: CombatantId,
    /// Applied in order.
    pub effects: Vec<Effect>,
    pub entries: Vec<LogEntry>,
    /// Actor's chain after this action.
    pub combo: ComboState,
    pub marker: ActionMarker,
    /// Scheduler meter cost class.
    pub speed_tier: SpeedTier,
    pub evaded: bool,
}

impl ActionResult {
    pub fn total_damage(&self) -> u32 {
        self.effects
            .iter()
            .map(|e| match e {
                Effect::Damage { amount, .. } => *amount,
                _ => 0,
            })
            .sum()
    }

    /// `Some(succeeded)` for flee attempts.
    pub fn flee(&self) -> Option<bool> {
        self.effects.iter().find_map(|e| match e {
            Effect::Flee { succeeded } => Some(*succeeded),
            _ => None,
        })
    }
}
