//! Authoring formats.
//!
//! Designers write techniques with plain-text bonus conditions
//! (`"opponent hp < 50%"`, `"user was hit"`); these specs turn them into
//! engine [`Technique`]s. Conditions are parsed here, once, at load time.

use combat_core::{
    BonusCondition, ComboRole, ConditionParser, EffectApplication, EffectTags, SpeedTier, Stance, Technique,
};

/// Condition phrases that mean "the user lost HP since its last action".
const WAS_HIT_PHRASES: &[&str] = &["user was hit", "self was hit", "was hit", "hit since last turn"];

/// Technique as written in `techniques.ron`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TechniqueSpec {
    pub id: String,
    /// Display name; defaults to the id.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chi_cost: u32,
    /// Required stance, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stance: Option<Stance>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tier: SpeedTier,
    #[cfg_attr(feature = "serde", serde(default))]
    pub role: ComboRole,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: EffectTags,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub hits: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonuses: Vec<BonusSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub applies: Vec<EffectApplication>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal_percent: u32,
}

#[cfg(feature = "serde")]
fn one() -> u8 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusSpec {
    pub when: String,
    pub percent: i32,
}

impl TechniqueSpec {
    pub fn new(id: impl Into<String>, power: u32) -> Self {
        Self {
            id: id.into(),
            name: None,
            power,
            chi_cost: 0,
            stance: None,
            tier: SpeedTier::default(),
            role: ComboRole::default(),
            tags: EffectTags::empty(),
            hits: 1,
            bonuses: Vec::new(),
            applies: Vec::new(),
            heal_percent: 0,
        }
    }

    /// Builds the engine technique. Bonuses with unreadable conditions are
    /// dropped and reported.
    pub fn build(self) -> (Technique, Vec<String>) {
        let mut diagnostics = Vec::new();
        let mut technique = Technique::new(self.id.as_str(), self.power)
            .with_chi_cost(self.chi_cost)
            .with_tier(self.tier)
            .with_role(self.role)
            .with_tags(self.tags)
            .with_hits(self.hits)
            .healing(self.heal_percent);
        if let Some(name) = self.name {
            technique = technique.named(name);
        }
        if let Some(stance) = self.stance {
            technique = technique.requiring(stance);
        }

        for bonus in self.bonuses {
            match parse_bonus(&bonus.when) {
                Ok(when) => technique = technique.with_bonus(when, bonus.percent),
                Err(reason) => {
                    let message = format!("technique '{}': bonus '{}' dropped: {reason}", self.id, bonus.when);
                    tracing::warn!("{message}");
                    diagnostics.push(message);
                }
            }
        }
        for application in self.applies {
            technique = technique.applying(application.target, application.effect);
        }
        (technique, diagnostics)
    }
}

fn parse_bonus(text: &str) -> Result<BonusCondition, combat_core::ConditionParseError> {
    let normalized = text.trim().to_ascii_lowercase();
    if WAS_HIT_PHRASES.contains(&normalized.as_str()) {
        return Ok(BonusCondition::UserWasHit);
    }
    ConditionParser::parse(&normalized).map(BonusCondition::TargetResource)
}
