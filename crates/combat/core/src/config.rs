//! Balance configuration consumed by the engine.
//!
//! The engine never hard-codes tuning values: every constant below arrives
//! through [`BalanceConfig`], typically loaded from `balance.toml` by
//! `combat-content`. `Default` carries the documented reference values.

use crate::state::{Stance, StatKind};
use crate::technique::SpeedTier;

/// Per-stance modifier set. Percentages unless noted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StanceProfile {
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    /// Flat chi regained per completed round.
    pub chi_regen: i32,
    /// Chance (percent) to evade a damaging action.
    pub evasion: i32,
}

impl StanceProfile {
    /// Percentage modifier for a stat.
    pub fn modifier(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
            StatKind::ChiRegen => self.chi_regen,
            StatKind::Evasion => self.evasion,
        }
    }
}

/// Modifier sets for every stance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StanceTable {
    pub flowing: StanceProfile,
    pub weathered: StanceProfile,
    pub hungry: StanceProfile,
}

impl StanceTable {
    pub fn profile(&self, stance: Stance) -> &StanceProfile {
        match stance {
            Stance::Flowing => &self.flowing,
            Stance::Weathered => &self.weathered,
            Stance::Hungry => &self.hungry,
        }
    }
}

impl Default for StanceTable {
    fn default() -> Self {
        Self {
            flowing: StanceProfile {
                speed: 15,
                chi_regen: 2,
                ..StanceProfile::default()
            },
            weathered: StanceProfile {
                attack: -10,
                defense: 30,
                speed: -10,
                chi_regen: 1,
                evasion: 0,
            },
            hungry: StanceProfile {
                attack: 30,
                defense: -20,
                ..StanceProfile::default()
            },
        }
    }
}

/// HP percentage thresholds for the convenience predicates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HpThresholds {
    pub low: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for HpThresholds {
    fn default() -> Self {
        Self {
            low: 30.0,
            high: 70.0,
            critical: 15.0,
        }
    }
}

/// Meter cost (percent of the scheduler threshold) per speed tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TierCosts {
    pub light: u32,
    pub standard: u32,
    pub heavy: u32,
}

impl TierCosts {
    pub fn cost(&self, tier: SpeedTier) -> u32 {
        match tier {
            SpeedTier::Light => self.light,
            SpeedTier::Standard => self.standard,
            SpeedTier::Heavy => self.heavy,
        }
    }
}

impl Default for TierCosts {
    fn default() -> Self {
        Self {
            light: 75,
            standard: 100,
            heavy: 125,
        }
    }
}

/// Named balance constants for one encounter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BalanceConfig {
    // ===== scheduler =====
    /// Meter value at which a combatant acts.
    pub scheduler_threshold: u32,
    /// Carry meter overflow past the threshold into the next turn.
    pub carry_overflow: bool,
    pub tier_costs: TierCosts,
    /// Entries in the lookahead handed to the presentation layer.
    pub lookahead: usize,

    // ===== resolution =====
    pub basic_attack_power: u32,
    /// Damage reduction while the target is defending.
    pub defend_mitigation_percent: u32,
    /// Finisher bonus per technique already in the chain.
    pub combo_bonus_percent: u32,
    pub combo_bonus_cap_percent: u32,
    pub chi_steal_amount: u32,
    /// Base damage multiplier of a primed critical (150 = ×1.5).
    pub crit_multiplier_percent: u32,
    /// Upper bound on evasion chance.
    pub max_evasion_percent: i32,

    // ===== flee =====
    pub flee_base_chance: f64,
    /// Chance added per point of speed the fleeing combatant has over the
    /// fastest opponent (negative when slower).
    pub flee_speed_factor: f64,
    pub flee_min_chance: f64,
    pub flee_max_chance: f64,
    /// A failed flee hands the fastest opponent an immediate free action.
    pub flee_failure_free_action: bool,

    // ===== resources =====
    pub chi_regen_base: u32,
    /// Wisdom points per extra chi regained each round (0 disables).
    pub chi_regen_wisdom_divisor: u32,

    // ===== engine =====
    /// Consecutive rejected inputs tolerated by [`crate::CombatEngine::run`].
    pub max_rejected_inputs: u32,

    pub hp_thresholds: HpThresholds,
    pub stances: StanceTable,
}

impl BalanceConfig {
    // ===== compile-time constants used as type parameters =====
    /// Distinct status effects a single combatant can carry.
    pub const MAX_STATUS_EFFECTS: usize = 8;

    pub fn new() -> Self {
        Self {
            scheduler_threshold: 100,
            carry_overflow: true,
            tier_costs: TierCosts::default(),
            lookahead: 6,
            basic_attack_power: 10,
            defend_mitigation_percent: 50,
            combo_bonus_percent: 15,
            combo_bonus_cap_percent: 60,
            chi_steal_amount: 10,
            crit_multiplier_percent: 150,
            max_evasion_percent: 75,
            flee_base_chance: 0.5,
            flee_speed_factor: 0.02,
            flee_min_chance: 0.05,
            flee_max_chance: 0.95,
            flee_failure_free_action: true,
            chi_regen_base: 2,
            chi_regen_wisdom_divisor: 5,
            max_rejected_inputs: 16,
            hp_thresholds: HpThresholds::default(),
            stances: StanceTable::default(),
        }
    }

    pub fn stance(&self, stance: Stance) -> &StanceProfile {
        self.stances.profile(stance)
    }

    /// Combo finisher bonus for a chain that already holds `chain_len` entries.
    pub fn combo_bonus(&self, chain_len: usize) -> u32 {
        let raw = self.combo_bonus_percent.saturating_mul(chain_len as u32);
        raw.min(self.combo_bonus_cap_percent)
    }
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self::new()
    }
}
