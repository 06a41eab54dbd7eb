//! Status effect bookkeeping for combatants.
//!
//! Status effects are timed stat modifiers (or plain markers such as
//! `"stunned"`) attached to a single combatant.
//!
//! # Round-based Duration
//!
//! Durations count completed rounds. [`StatusEffects::tick`] is called exactly
//! once per combatant per completed round: it decrements every duration and
//! drops any effect that reaches zero.
//!
//! # Stacking
//!
//! At most one instance per effect name exists. Re-applying an effect never
//! shortens its remaining duration.

use arrayvec::ArrayVec;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::config::BalanceConfig;

/// Stat a status effect (or stance) modifies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StatKind {
    Attack,
    Defense,
    Speed,
    ChiRegen,
    Evasion,
}

/// How a re-applied effect combines with the existing instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StackPolicy {
    /// Replace magnitude, keep the longer duration.
    #[default]
    Refresh,
    /// Add a stack (up to `max_stacks`), keep the longer duration.
    Intensify { max_stacks: u8 },
}

/// A single timed modifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub name: String,
    /// Remaining duration in rounds.
    pub duration: i32,
    /// Modified stat. `None` for pure markers (e.g. "stunned").
    #[cfg_attr(feature = "serde", serde(default))]
    pub stat: Option<StatKind>,
    /// Percentage per stack (20 = +20%).
    #[cfg_attr(feature = "serde", serde(default))]
    pub magnitude: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy: StackPolicy,
    #[cfg_attr(feature = "serde", serde(default = "default_stacks"))]
    pub stacks: u8,
}

#[cfg(feature = "serde")]
fn default_stacks() -> u8 {
    1
}

impl StatusEffect {
    /// Creates a marker effect with no stat modifier.
    pub fn marker(name: impl Into<String>, duration: i32) -> Self {
        Self {
            name: name.into(),
            duration,
            stat: None,
            magnitude: 0,
            policy: StackPolicy::Refresh,
            stacks: 1,
        }
    }

    /// Creates an effect modifying `stat` by `magnitude` percent.
    pub fn modifier(name: impl Into<String>, stat: StatKind, magnitude: i32, duration: i32) -> Self {
        Self {
            stat: Some(stat),
            magnitude,
            ..Self::marker(name, duration)
        }
    }

    pub fn with_policy(mut self, policy: StackPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Total contribution of this effect (magnitude × stacks).
    pub fn total_magnitude(&self) -> i32 {
        self.magnitude * self.stacks.max(1) as i32
    }

    /// Buffs raise a stat, debuffs lower it; markers are neither.
    pub fn is_debuff(&self) -> bool {
        self.stat.is_some() && self.magnitude < 0
    }
}

/// Result of [`StatusEffects::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added,
    Refreshed { duration: i32 },
    Intensified { stacks: u8, duration: i32 },
    /// Non-positive duration; nothing stored.
    Ignored,
    /// Every slot is taken by other effects.
    Full,
}

/// Active status effects on a combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { BalanceConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    /// Attaches an effect, refreshing an existing instance of the same name.
    pub fn apply(&mut self, incoming: StatusEffect) -> ApplyOutcome {
        if incoming.duration <= 0 {
            return ApplyOutcome::Ignored;
        }

        if let Some(existing) = self.effects.iter_mut().find(|e| e.name == incoming.name) {
            existing.duration = existing.duration.max(incoming.duration);
            return match incoming.policy {
                StackPolicy::Refresh => {
                    existing.stat = incoming.stat;
                    existing.magnitude = incoming.magnitude;
                    existing.policy = incoming.policy;
                    ApplyOutcome::Refreshed {
                        duration: existing.duration,
                    }
                }
                StackPolicy::Intensify { max_stacks } => {
                    let cap = max_stacks.max(1);
                    existing.stacks = existing.stacks.saturating_add(1).min(cap);
                    existing.policy = incoming.policy;
                    ApplyOutcome::Intensified {
                        stacks: existing.stacks,
                        duration: existing.duration,
                    }
                }
            };
        }

        let mut effect = incoming;
        effect.stacks = effect.stacks.max(1);
        match self.effects.try_push(effect) {
            Ok(()) => ApplyOutcome::Added,
            Err(_) => ApplyOutcome::Full,
        }
    }

    /// Advances every effect by one round and returns those that expired.
    pub fn tick(&mut self) -> Vec<StatusEffect> {
        for effect in self.effects.iter_mut() {
            effect.duration -= 1;
        }

        let mut expired = Vec::new();
        let mut kept = ArrayVec::new();
        for effect in self.effects.drain(..) {
            if effect.duration <= 0 {
                expired.push(effect);
            } else {
                kept.push(effect);
            }
        }
        self.effects = kept;
        expired
    }

    /// Sums the percentage modifiers of all effects on `stat`.
    pub fn aggregate_modifier(&self, stat: StatKind) -> i32 {
        self.effects
            .iter()
            .filter(|e| e.stat == Some(stat))
            .map(StatusEffect::total_magnitude)
            .sum()
    }

    /// Removes an effect immediately.
    pub fn remove(&mut self, name: &str) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.name == name)?;
        Some(self.effects.remove(index))
    }

    /// Removes every effect, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.effects.len();
        self.effects.clear();
        count
    }

    pub fn has(&self, name: &str) -> bool {
        self.effects.iter().any(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn focus(duration: i32) -> StatusEffect {
        StatusEffect::modifier("focus", StatKind::Attack, 20, duration)
    }

    #[test]
    fn reapplying_never_shortens_duration() {
        let mut effects = StatusEffects::empty();
        assert_eq!(effects.apply(focus(3)), ApplyOutcome::Added);
        assert_eq!(
            effects.apply(focus(1)),
            ApplyOutcome::Refreshed { duration: 3 }
        );
        assert_eq!(
            effects.apply(focus(5)),
            ApplyOutcome::Refreshed { duration: 5 }
        );
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn intensify_caps_stacks() {
        let mut effects = StatusEffects::empty();
        let bleed = StatusEffect::modifier("bleed", StatKind::Defense, -5, 2)
            .with_policy(StackPolicy::Intensify { max_stacks: 2 });

        effects.apply(bleed.clone());
        effects.apply(bleed.clone());
        let outcome = effects.apply(bleed);

        assert_eq!(
            outcome,
            ApplyOutcome::Intensified {
                stacks: 2,
                duration: 2
            }
        );
        assert_eq!(effects.aggregate_modifier(StatKind::Defense), -10);
    }

    #[test]
    fn tick_removes_expired_effects() {
        let mut effects = StatusEffects::empty();
        effects.apply(focus(3));
        effects.apply(StatusEffect::marker("stunned", 1));

        let expired = effects.tick();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].name, "stunned");
        assert_eq!(effects.get("focus").map(|e| e.duration), Some(2));

        effects.tick();
        let expired = effects.tick();
        assert_eq!(expired[0].name, "focus");
        assert!(effects.is_empty());
    }

    #[test]
    fn aggregate_only_counts_matching_stat() {
        let mut effects = StatusEffects::empty();
        effects.apply(focus(2));
        effects.apply(StatusEffect::modifier("war-cry", StatKind::Attack, 10, 2));
        effects.apply(StatusEffect::modifier("slow", StatKind::Speed, -30, 2));
        effects.apply(StatusEffect::marker("stunned", 1));

        assert_eq!(effects.aggregate_modifier(StatKind::Attack), 30);
        assert_eq!(effects.aggregate_modifier(StatKind::Speed), -30);
        assert_eq!(effects.aggregate_modifier(StatKind::Evasion), 0);
    }

    #[test]
    fn non_positive_duration_is_ignored() {
        let mut effects = StatusEffects::empty();
        assert_eq!(effects.apply(focus(0)), ApplyOutcome::Ignored);
        assert!(effects.is_empty());
    }

    #[test]
    fn full_list_rejects_new_names() {
        let mut effects = StatusEffects::empty();
        for i in 0..BalanceConfig::MAX_STATUS_EFFECTS {
            assert_eq!(
                effects.apply(StatusEffect::marker(format!("mark-{i}"), 2)),
                ApplyOutcome::Added
            );
        }
        assert_eq!(
            effects.apply(StatusEffect::marker("one-too-many", 2)),
            ApplyOutcome::Full
        );
        // Existing names still refresh when full.
        assert_eq!(
            effects.apply(StatusEffect::marker("mark-0", 4)),
            ApplyOutcome::Refreshed { duration: 4 }
        );
    }

    #[test]
    fn remove_and_clear() {
        let mut effects = StatusEffects::empty();
        effects.apply(focus(2));
        effects.apply(StatusEffect::marker("stunned", 1));

        assert_eq!(effects.remove("focus").map(|e| e.name), Some("focus".to_string()));
        assert!(effects.remove("focus").is_none());
        assert_eq!(effects.clear(), 1);
        assert!(effects.is_empty());
    }

    proptest! {
        #[test]
        fn tick_leaves_only_positive_durations(durations in proptest::collection::vec(1i32..6, 0..8)) {
            let mut effects = StatusEffects::empty();
            for (i, d) in durations.iter().enumerate() {
                effects.apply(StatusEffect::marker(format!("e{i}"), *d));
            }
            let short: Vec<String> = effects
                .iter()
                .filter(|e| e.duration <= 1)
                .map(|e| e.name.clone())
                .collect();

            effects.tick();

            prop_assert!(effects.iter().all(|e| e.duration >= 1));
            for name in short {
                prop_assert!(!effects.has(&name));
            }
        }

        #[test]
        fn double_apply_keeps_single_entry_and_max_duration(a in 1i32..20, b in 1i32..20) {
            let mut effects = StatusEffects::empty();
            effects.apply(focus(a));
            effects.apply(focus(b));

            prop_assert_eq!(effects.len(), 1);
            prop_assert_eq!(effects.get("focus").map(|e| e.duration), Some(a.max(b)));
        }
    }
}
