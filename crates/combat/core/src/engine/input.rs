use crate::action::CombatAction;
use crate::combat::ActionRejected;
use crate::state::Combatant;

use super::outcome::PlayerPrompt;

/// Source of player actions.
///
/// The engine itself never blocks: [`CombatEngine::run`](super::CombatEngine::run)
/// calls this whenever a player turn comes up.
pub trait PlayerInput {
    /// Returns the next action, or `None` when no more input is available.
    fn choose(&mut self, prompt: &PlayerPrompt, combatants: &[Combatant]) -> Option<CombatAction>;

    /// Called when the previous choice was refused. The engine asks again.
    fn rejected(&mut self, _reason: &ActionRejected) {}
}

impl<F> PlayerInput for F
where
    F: FnMut(&PlayerPrompt, &[Combatant]) -> Option<CombatAction>,
{
    fn choose(&mut self, prompt: &PlayerPrompt, combatants: &[Combatant]) -> Option<CombatAction> {
        self(prompt, combatants)
    }
}
