//! Technique definitions.
//!
//! Techniques are immutable authored data loaded once into a
//! [`TechniqueCatalog`]; the engine never mutates them.

mod catalog;

pub use catalog::{CatalogError, TechniqueCatalog, UseDenied};

use bitflags::bitflags;
use strum::{Display, EnumString, IntoStaticStr};

use crate::condition::ResourceCondition;
use crate::state::{Stance, StatusEffect};

/// Identifier of a technique (kebab-case by convention, e.g. `second-wind`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TechniqueId(pub String);

impl TechniqueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TechniqueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TechniqueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&TechniqueId> for TechniqueId {
    fn from(value: &TechniqueId) -> Self {
        value.clone()
    }
}

impl core::fmt::Display for TechniqueId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position a technique can take in a combo chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ComboRole {
    Starter,
    Link,
    Finisher,
    /// Not part of any chain.
    #[default]
    #[strum(serialize = "none")]
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    Standalone,
}

/// Scheduler meter cost class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SpeedTier {
    Light,
    #[default]
    Standard,
    /// Slow, committal techniques. Marks the user as having "used a heavy
    /// technique" for AI conditions.
    Heavy,
}

/// Stance a technique demands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StanceRequirement {
    #[default]
    Any,
    Only(Stance),
}

impl StanceRequirement {
    pub fn allows(&self, stance: Stance) -> bool {
        match self {
            Self::Any => true,
            Self::Only(required) => *required == stance,
        }
    }
}

bitflags! {
    /// Special-effect tags that alter resolution.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct EffectTags: u16 {
        /// Staggers the target: no meter gain on the next tick.
        const KNOCKBACK         = 1 << 0;
        /// Moves a fixed amount of chi from target to user.
        const CHI_STEAL         = 1 << 1;
        /// Hits `hits` times.
        const MULTI_HIT         = 1 << 2;
        /// Evaluates `bonuses`.
        const CONDITIONAL_BONUS = 1 << 3;
        /// Primes the user's next damaging action as a critical.
        const CRIT_SETUP        = 1 << 4;
        /// Raises the user's defending flag.
        const SELF_GUARD        = 1 << 5;
        /// Clears the user's status effects before new ones are applied.
        const CLEANSE           = 1 << 6;
    }
}

/// When a conditional damage bonus applies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum BonusCondition {
    /// Evaluated before the hit: `opponent` is the defender, `self` the attacker.
    TargetResource(ResourceCondition),
    /// The user lost HP since its previous action.
    UserWasHit,
}

/// A percentage damage bonus gated by a condition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalBonus {
    pub when: BonusCondition,
    pub percent: i32,
}

/// Who receives a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EffectTarget {
    User,
    Opponent,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectApplication {
    pub target: EffectTarget,
    pub effect: StatusEffect,
}

/// A discrete combat action beyond the basic attack.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Technique {
    pub id: TechniqueId,
    pub name: String,
    /// Base power; 0 marks a non-damaging technique.
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chi_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stance: StanceRequirement,
    #[cfg_attr(feature = "serde", serde(default))]
    pub speed_tier: SpeedTier,
    #[cfg_attr(feature = "serde", serde(default))]
    pub combo_role: ComboRole,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: EffectTags,
    #[cfg_attr(feature = "serde", serde(default = "default_hits"))]
    pub hits: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<ConditionalBonus>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub applies: Vec<EffectApplication>,
    /// Healing as a percentage of the user's max HP.
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal_percent: u32,
}

#[cfg(feature = "serde")]
fn default_hits() -> u8 {
    1
}

impl Technique {
    pub fn new(id: impl Into<TechniqueId>, power: u32) -> Self {
        let id = id.into();
        Self {
            name: id.0.clone(),
            id,
            power,
            chi_cost: 0,
            stance: StanceRequirement::Any,
            speed_tier: SpeedTier::Standard,
            combo_role: ComboRole::Standalone,
            tags: EffectTags::empty(),
            hits: 1,
            bonuses: Vec::new(),
            applies: Vec::new(),
            heal_percent: 0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_chi_cost(mut self, chi_cost: u32) -> Self {
        self.chi_cost = chi_cost;
        self
    }

    pub fn requiring(mut self, stance: Stance) -> Self {
        self.stance = StanceRequirement::Only(stance);
        self
    }

    pub fn with_role(mut self, role: ComboRole) -> Self {
        self.combo_role = role;
        self
    }

    pub fn with_tier(mut self, tier: SpeedTier) -> Self {
        self.speed_tier = tier;
        self
    }

    pub fn with_tags(mut self, tags: EffectTags) -> Self {
        self.tags |= tags;
        self
    }

    pub fn with_hits(mut self, hits: u8) -> Self {
        self.hits = hits.max(1);
        if self.hits > 1 {
            self.tags |= EffectTags::MULTI_HIT;
        }
        self
    }

    pub fn with_bonus(mut self, when: BonusCondition, percent: i32) -> Self {
        self.bonuses.push(ConditionalBonus { when, percent });
        self.tags |= EffectTags::CONDITIONAL_BONUS;
        self
    }

    pub fn applying(mut self, target: EffectTarget, effect: StatusEffect) -> Self {
        self.applies.push(EffectApplication { target, effect });
        self
    }

    pub fn healing(mut self, percent: u32) -> Self {
        self.heal_percent = percent;
        self
    }

    /// Brings tags in line with the data they describe.
    ///
    /// Authored data may list bonuses or hits without the matching tag; the
    /// catalog normalizes every technique on insert.
    pub fn normalized(mut self) -> Self {
        self.hits = self.hits.max(1);
        if self.hits > 1 {
            self.tags |= EffectTags::MULTI_HIT;
        }
        if !self.bonuses.is_empty() {
            self.tags |= EffectTags::CONDITIONAL_BONUS;
        }
        self
    }

    pub fn is_damaging(&self) -> bool {
        self.power > 0
    }

    /// Whether resolution touches an opponent at all.
    pub fn needs_target(&self) -> bool {
        self.is_damaging()
            || self.tags.intersects(EffectTags::KNOCKBACK | EffectTags::CHI_STEAL)
            || self.applies.iter().any(|a| a.target == EffectTarget::Opponent)
    }

    pub fn is_heavy(&self) -> bool {
        self.speed_tier == SpeedTier::Heavy
    }

    pub fn has(&self, tags: EffectTags) -> bool {
        self.tags.contains(tags)
    }

    pub fn hit_count(&self) -> u8 {
        if self.tags.contains(EffectTags::MULTI_HIT) {
            self.hits.max(1)
        } else {
            1
        }
    }
}
