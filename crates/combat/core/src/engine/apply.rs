//! Effect application. The only place combatants are mutated mid-fight.

use crate::combat::{ActionResult, Effect};
use crate::log::LogEntry;
use crate::rng::RandomSource;
use crate::state::{ApplyOutcome, CombatantId};

use super::CombatEngine;

impl<'a, R: RandomSource> CombatEngine<'a, R> {
    pub(super) fn apply_result(&mut self, result: &ActionResult) {
        self.log.extend(result.entries.iter().cloned());
        for effect in &result.effects {
            self.apply_effect(result.actor, effect);
        }
    }

    fn apply_effect(&mut self, actor: CombatantId, effect: &Effect) {
        match effect {
            Effect::SpendChi { who, amount } => {
                if let Some(c) = self.combatant_mut(*who) {
                    c.chi.drain(*amount);
                }
            }
            Effect::Damage { target, amount, .. } => {
                let Some(c) = self.combatant_mut(*target) else {
                    return;
                };
                let taken = c.hp.drain(*amount);
                c.damage_taken_since_turn = c.damage_taken_since_turn.saturating_add(taken);
                let target_is_player = c.is_player();

                if target_is_player {
                    self.damage_taken = self.damage_taken.saturating_add(taken);
                } else if actor.is_player() {
                    self.damage_dealt = self.damage_dealt.saturating_add(taken);
                }
            }
            Effect::Heal { target, amount } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.hp.fill(*amount);
                }
            }
            Effect::TransferChi { from, to, amount } => {
                let moved = self.combatant_mut(*from).map_or(0, |c| c.chi.drain(*amount));
                if let Some(c) = self.combatant_mut(*to) {
                    c.chi.fill(moved);
                }
            }
            Effect::ApplyStatus { target, effect } => {
                let Some(c) = self.combatant_mut(*target) else {
                    return;
                };
                if c.status_effects.apply(effect.clone()) == ApplyOutcome::Full {
                    let message = format!("{} cannot hold another status effect; '{}' dropped", c.name, effect.name);
                    tracing::warn!("{message}");
                    self.log.push(LogEntry::diagnostic(message));
                }
            }
            Effect::ClearStatuses { target } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.status_effects.clear();
                }
            }
            Effect::SetDefending { target } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.defending = true;
                }
            }
            Effect::Stagger { target } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.staggered = true;
                }
            }
            Effect::PrimeCrit { target } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.crit_primed = true;
                }
            }
            Effect::ConsumeCrit { target } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.crit_primed = false;
                }
            }
            Effect::ChangeStance { target, stance } => {
                if let Some(c) = self.combatant_mut(*target) {
                    c.stance = *stance;
                }
            }
            Effect::Flee { succeeded } => {
                if *succeeded {
                    self.fled = true;
                }
            }
        }
    }
}
