//! Effective stats and the damage pipeline.
//!
//! All arithmetic is integer. Percentage steps round half up.

use crate::config::BalanceConfig;
use crate::state::{Combatant, StatKind};

/// `value × (100 + percent) / 100`, rounded half up, floored at 0.
pub fn apply_percent(value: u32, percent: i32) -> u32 {
    let scaled = value as i64 * (100 + percent as i64);
    if scaled <= 0 {
        return 0;
    }
    ((scaled + 50) / 100).min(u32::MAX as i64) as u32
}

fn base_stat(combatant: &Combatant, stat: StatKind) -> u32 {
    match stat {
        StatKind::Attack => combatant.stats.strength,
        StatKind::Defense => combatant.stats.endurance,
        StatKind::Speed => combatant.stats.dexterity,
        StatKind::ChiRegen | StatKind::Evasion => 0,
    }
}

/// Attack, defense or speed after stance and status modifiers. Never below 1.
pub fn effective_stat(combatant: &Combatant, stat: StatKind, config: &BalanceConfig) -> u32 {
    let stance = config.stance(combatant.stance).modifier(stat);
    let status = combatant.status_effects().aggregate_modifier(stat);
    let value = apply_percent(apply_percent(base_stat(combatant, stat), stance), status);
    value.max(1)
}

/// Chance (percent) to evade a damaging action, capped by config.
pub fn evasion_percent(combatant: &Combatant, config: &BalanceConfig) -> i32 {
    let stance = config.stance(combatant.stance).evasion;
    let status = combatant.status_effects().aggregate_modifier(StatKind::Evasion);
    (stance + status).clamp(0, config.max_evasion_percent.max(0))
}

/// Chi regained at the end of a round.
pub fn chi_regen(combatant: &Combatant, config: &BalanceConfig) -> u32 {
    let wisdom = match config.chi_regen_wisdom_divisor {
        0 => 0,
        divisor => combatant.stats.wisdom / divisor,
    };
    let stance = config.stance(combatant.stance).chi_regen;
    let status = combatant.status_effects().aggregate_modifier(StatKind::ChiRegen);
    let total = config.chi_regen_base as i64 + wisdom as i64 + stance as i64 + status as i64;
    total.clamp(0, u32::MAX as i64) as u32
}

/// `power × attack / defense`, rounded half up, at least 1.
pub fn base_damage(power: u32, attack: u32, defense: u32) -> u32 {
    let defense = defense.max(1) as u64;
    let numerator = power as u64 * attack as u64;
    let rounded = (numerator * 2 + defense) / (defense * 2);
    rounded.clamp(1, u32::MAX as u64) as u32
}

/// Percentage stages applied to one hit, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageStages {
    /// Bonuses gated on the target's resources.
    pub conditional: i32,
    /// Finisher bonus from the chain length.
    pub combo: i32,
    /// Bonuses gated on the attacker having been hit.
    pub reactive: i32,
    /// Reduction while the target defends (positive number).
    pub mitigation: i32,
}

impl DamageStages {
    pub fn apply(&self, base: u32) -> u32 {
        let mut damage = base;
        if self.conditional != 0 {
            damage = apply_percent(damage, self.conditional);
        }
        if self.combo != 0 {
            damage = apply_percent(damage, self.combo);
        }
        if self.reactive != 0 {
            damage = apply_percent(damage, self.reactive);
        }
        if self.mitigation != 0 {
            damage = apply_percent(damage, -self.mitigation);
        }
        damage
    }
}
