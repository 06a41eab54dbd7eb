//! Combatant records owned by the engine for the duration of an encounter.
//!
//! Combatants arrive fully formed from an external factory and are returned to
//! the caller inside [`CombatResult`](crate::CombatResult). While an encounter
//! runs, only [`CombatEngine`](crate::CombatEngine) mutates them.

pub mod stance;
pub mod status;

pub use stance::Stance;
pub use status::{ApplyOutcome, StackPolicy, StatKind, StatusEffect, StatusEffects};

use crate::action::ActionMarker;
use crate::technique::TechniqueId;

/// Unique identifier of a combatant within an encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u8);

impl CombatantId {
    pub const PLAYER: Self = Self(0);

    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side of the encounter a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Side {
    Player,
    Enemy,
}

/// Base attributes.
///
/// - strength drives offense
/// - endurance drives defense
/// - dexterity drives speed (turn meter gain, flee chance)
/// - wisdom adds chi regeneration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub strength: u32,
    pub endurance: u32,
    pub dexterity: u32,
    pub wisdom: u32,
}

impl BaseStats {
    pub const fn new(strength: u32, endurance: u32, dexterity: u32, wisdom: u32) -> Self {
        Self {
            strength,
            endurance,
            dexterity,
            wisdom,
        }
    }
}

/// A bounded resource such as HP or chi. `current` stays in `[0, max]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawGauge"))]
pub struct Gauge {
    current: u32,
    max: u32,
}

/// Wire form of [`Gauge`]; loaded values go through [`Gauge::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGauge {
    current: u32,
    max: u32,
}

#[cfg(feature = "serde")]
impl From<RawGauge> for Gauge {
    fn from(raw: RawGauge) -> Self {
        Self::new(raw.current, raw.max)
    }
}

impl Gauge {
    /// Creates a gauge, clamping `current` to `max`.
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn full(max: u32) -> Self {
        Self::new(max, max)
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Percentage of max, 0 when max is 0.
    pub fn percent(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        self.current as f64 * 100.0 / self.max as f64
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Missing amount up to max.
    pub fn room(&self) -> u32 {
        self.max.saturating_sub(self.current)
    }

    pub fn set(&mut self, value: u32) {
        self.current = value.min(self.max);
    }

    /// Removes up to `amount`; returns what was actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current);
        self.current -= taken;
        taken
    }

    /// Adds up to `amount`; returns what was actually added.
    pub fn fill(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.room());
        self.current += added;
        added
    }
}

/// A participant in an encounter.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub hp: Gauge,
    pub chi: Gauge,
    pub stats: BaseStats,
    pub stance: Stance,
    /// Technique ids this combatant may use. Supplied by progression.
    pub known_techniques: Vec<TechniqueId>,
    /// AI pattern id for enemies (and autopilot players).
    #[cfg_attr(feature = "serde", serde(default))]
    pub ai_pattern: Option<String>,

    // === engine-managed ===
    #[cfg_attr(feature = "serde", serde(default))]
    pub(crate) status_effects: StatusEffects,
    /// Mirror of the scheduler meter, refreshed after every scheduling step.
    #[cfg_attr(feature = "serde", serde(default))]
    pub turn_meter: u32,
    /// Mitigates incoming damage until this combatant's next turn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub defending: bool,
    /// Knocked back: gains no meter on the next scheduling tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub staggered: bool,
    /// Next damaging action applies the critical multiplier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_primed: bool,
    /// HP lost since this combatant last acted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_taken_since_turn: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_action: Option<ActionMarker>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub turns_taken: u32,
}

impl Combatant {
    fn new(id: CombatantId, name: impl Into<String>, side: Side, stats: BaseStats) -> Self {
        Self {
            id,
            name: name.into(),
            side,
            hp: Gauge::full(100),
            chi: Gauge::full(50),
            stats,
            stance: Stance::default(),
            known_techniques: Vec::new(),
            ai_pattern: None,
            status_effects: StatusEffects::empty(),
            turn_meter: 0,
            defending: false,
            staggered: false,
            crit_primed: false,
            damage_taken_since_turn: 0,
            last_action: None,
            turns_taken: 0,
        }
    }

    /// Creates the player combatant (always [`CombatantId::PLAYER`]).
    pub fn player(name: impl Into<String>, stats: BaseStats) -> Self {
        Self::new(CombatantId::PLAYER, name, Side::Player, stats)
    }

    /// Creates an enemy combatant.
    pub fn enemy(id: u8, name: impl Into<String>, stats: BaseStats) -> Self {
        Self::new(CombatantId(id), name, Side::Enemy, stats)
    }

    pub fn with_hp(mut self, current: u32, max: u32) -> Self {
        self.hp = Gauge::new(current, max);
        self
    }

    pub fn with_chi(mut self, current: u32, max: u32) -> Self {
        self.chi = Gauge::new(current, max);
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    pub fn with_techniques<I, T>(mut self, techniques: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TechniqueId>,
    {
        self.known_techniques = techniques.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.ai_pattern = Some(pattern.into());
        self
    }

    /// Starts the encounter with an effect already attached.
    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.status_effects.apply(effect);
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.hp.is_empty()
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.hp.is_empty()
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }

    pub fn knows(&self, technique: &TechniqueId) -> bool {
        self.known_techniques.contains(technique)
    }

    pub fn status_effects(&self) -> &StatusEffects {
        &self.status_effects
    }

    pub fn has_status(&self, name: &str) -> bool {
        self.status_effects.has(name)
    }

    /// Staggered this tick or carrying a "stunned" marker.
    pub fn is_stunned(&self) -> bool {
        self.staggered || self.status_effects.has("stunned")
    }

    pub fn used_heavy_last_turn(&self) -> bool {
        matches!(self.last_action, Some(ActionMarker::Technique { heavy: true, .. }))
    }

    pub fn is_opponent_of(&self, other: &Combatant) -> bool {
        self.side != other.side
    }
}
