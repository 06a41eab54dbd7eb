//! Deterministic turn-based combat rules.
//!
//! `combat-core` holds every rule of a fight: the speed-driven turn scheduler,
//! technique resolution, combo chains, status effects, stance modifiers and
//! rule-based enemy AI. It performs no I/O; authored content is handed in as
//! a [`TechniqueCatalog`], an [`AiLibrary`] and a [`BalanceConfig`], and all
//! randomness is drawn from an injected [`RandomSource`].
//!
//! All state mutation during a fight flows through [`CombatEngine`]. The
//! other types are pure and can be used on their own (e.g. to preview damage
//! or validate content).
pub mod action;
pub mod ai;
pub mod combat;
pub mod combo;
pub mod compare;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod technique;

pub use action::{ActionMarker, CombatAction};
pub use ai::{
    AiDecision, AiDecisionEngine, AiLibrary, AiPattern, AiRule, AiView, Condition, RuleAction,
    RuleActionParseError, RuleSpec,
};
pub use combat::{ActionRejected, ActionResolver, ActionResult, Effect};
pub use combo::{ComboState, ComboTracker, Expected};
pub use compare::CompareOp;
pub use condition::{ConditionParseError, ConditionParser, Resource, ResourceCondition, Subject, Threshold};
pub use config::{BalanceConfig, HpThresholds, StanceProfile, StanceTable, TierCosts};
pub use engine::{
    CombatEngine, CombatEnv, CombatPhase, CombatResult, Encounter, EncounterError, EngineError, Outcome,
    PlayerInput, PlayerPrompt, Step,
};
pub use error::{CombatError, ErrorSeverity};
pub use log::{CombatLog, LogData, LogEntry, LogKind};
pub use rng::{FixedRolls, PcgRng, RandomSource};
pub use scheduler::{Advance, Pace, SchedulerError, TurnQueueEntry, TurnScheduler};
pub use state::{
    ApplyOutcome, BaseStats, Combatant, CombatantId, Gauge, Side, StackPolicy, Stance, StatKind, StatusEffect,
    StatusEffects,
};
pub use technique::{
    BonusCondition, CatalogError, ComboRole, ConditionalBonus, EffectApplication, EffectTags, EffectTarget,
    SpeedTier, StanceRequirement, Technique, TechniqueCatalog, TechniqueId, UseDenied,
};
