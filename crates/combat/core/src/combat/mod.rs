//! Action resolution.
//!
//! [`ActionResolver`] turns one [`CombatAction`] into an [`ActionResult`]: an
//! ordered list of [`Effect`]s plus the log entries describing them. It reads
//! combatants but never mutates them; the engine applies the effects.
//!
//! Damage pipeline for each hit:
//!
//! 1. base = round(power × attack / defense), at least 1
//! 2. primed critical multiplies the base
//! 3. conditional bonus on the target's resources
//! 4. finisher bonus from the chain length
//! 5. reactive bonus if the attacker was hit since its last turn
//! 6. mitigation while the target defends
//! 7. clamp at zero

pub mod damage;
mod result;

pub use result::{ActionResult, Effect};

use thiserror::Error;

use crate::action::{ActionMarker, CombatAction};
use crate::combo::{ComboState, ComboTracker};
use crate::compare;
use crate::condition::ConditionParser;
use crate::config::BalanceConfig;
use crate::error::{CombatError, ErrorSeverity};
use crate::log::LogEntry;
use crate::rng::RandomSource;
use crate::state::{Combatant, CombatantId, Stance, StatKind};
use crate::technique::{
    BonusCondition, EffectTags, EffectTarget, SpeedTier, Technique, TechniqueCatalog, TechniqueId, UseDenied,
};

use damage::{DamageStages, apply_percent, base_damage, effective_stat, evasion_percent};

/// Why an action was refused before resolution.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionRejected {
    #[error("unknown technique '{0}'")]
    UnknownTechnique(TechniqueId),

    #[error("cannot use technique: {0}")]
    Unusable(#[from] UseDenied),

    #[error("no target available")]
    NoTarget,

    #[error("{0} is not a valid target")]
    InvalidTarget(CombatantId),

    #[error("already in {0} stance")]
    AlreadyInStance(Stance),

    #[error("{0} cannot act right now")]
    NotActing(CombatantId),

    #[error("the engine is not waiting for player input")]
    NotAwaitingInput,

    #[error("the encounter has already finished")]
    EncounterFinished,
}

impl CombatError for ActionRejected {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotAwaitingInput | Self::EncounterFinished => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTechnique(_) => "ACTION_UNKNOWN_TECHNIQUE",
            Self::Unusable(_) => "ACTION_UNUSABLE",
            Self::NoTarget => "ACTION_NO_TARGET",
            Self::InvalidTarget(_) => "ACTION_INVALID_TARGET",
            Self::AlreadyInStance(_) => "ACTION_ALREADY_IN_STANCE",
            Self::NotActing(_) => "ACTION_NOT_ACTING",
            Self::NotAwaitingInput => "ACTION_NOT_AWAITING_INPUT",
            Self::EncounterFinished => "ACTION_ENCOUNTER_FINISHED",
        }
    }
}

const HIT: &str = "{target} takes {amount} damage ({remaining} HP left)";
const CRITICAL_HIT: &str = "Critical! {target} takes {amount} damage ({remaining} HP left)";

#[derive(Default)]
struct Outcome {
    effects: Vec<Effect>,
    entries: Vec<LogEntry>,
}

/// Stateless resolver over injected configuration.
#[derive(Clone, Copy)]
pub struct ActionResolver<'a> {
    config: &'a BalanceConfig,
    catalog: &'a TechniqueCatalog,
}

impl<'a> ActionResolver<'a> {
    pub fn new(config: &'a BalanceConfig, catalog: &'a TechniqueCatalog) -> Self {
        Self { config, catalog }
    }

    /// Checks an action without drawing randomness or building effects.
    pub fn validate(
        &self,
        action: &CombatAction,
        attacker: &Combatant,
        defender: Option<&Combatant>,
    ) -> Result<(), ActionRejected> {
        match action {
            CombatAction::BasicAttack { target } => check_target(attacker, defender, *target),
            CombatAction::Technique { id, target } => {
                let technique = self.lookup(id)?;
                self.catalog.can_use(
                    technique,
                    attacker.stance,
                    attacker.chi.current(),
                    Some(&attacker.known_techniques),
                )?;
                if technique.needs_target() {
                    check_target(attacker, defender, *target)?;
                }
                Ok(())
            }
            CombatAction::ChangeStance(stance) if *stance == attacker.stance => {
                Err(ActionRejected::AlreadyInStance(*stance))
            }
            CombatAction::ChangeStance(_) | CombatAction::Defend | CombatAction::Flee => Ok(()),
        }
    }

    /// Resolves `action`.
    ///
    /// For flee attempts `defender` is the fastest living opponent (or `None`).
    pub fn resolve(
        &self,
        action: &CombatAction,
        attacker: &Combatant,
        defender: Option<&Combatant>,
        combo: &ComboState,
        rng: &mut (impl RandomSource + ?Sized),
    ) -> Result<ActionResult, ActionRejected> {
        self.validate(action, attacker, defender)?;

        let mut out = Outcome::default();
        let mut combo_after = ComboState::default();
        let mut evaded = false;
        let mut speed_tier = SpeedTier::Standard;

        let marker = match action {
            CombatAction::BasicAttack { .. } => {
                let defender = defender.ok_or(ActionRejected::NoTarget)?;
                out.entries.push(
                    LogEntry::action("{actor} attacks {target}")
                        .actor(&attacker.name)
                        .target(&defender.name),
                );
                evaded = self.strike(self.config.basic_attack_power, None, 0, attacker, defender, rng, &mut out);
                ActionMarker::BasicAttack
            }
            CombatAction::Technique { id, .. } => {
                let technique = self.lookup(id)?;
                speed_tier = technique.speed_tier;
                evaded = self.resolve_technique(technique, attacker, defender, combo, rng, &mut out)?;
                combo_after = if evaded {
                    ComboTracker::reset(combo)
                } else {
                    ComboTracker::advance(combo, technique)
                };
                ActionMarker::Technique {
                    id: technique.id.clone(),
                    heavy: technique.is_heavy(),
                }
            }
            CombatAction::ChangeStance(stance) => {
                out.effects.push(Effect::ChangeStance {
                    target: attacker.id,
                    stance: *stance,
                });
                out.entries.push(
                    LogEntry::phase("{actor} shifts into {label} stance")
                        .actor(&attacker.name)
                        .label(stance.as_str()),
                );
                ActionMarker::StanceChange
            }
            CombatAction::Defend => {
                out.effects.push(Effect::SetDefending { target: attacker.id });
                out.entries.push(LogEntry::action("{actor} braces to defend").actor(&attacker.name));
                ActionMarker::Defend
            }
            CombatAction::Flee => {
                let succeeded = self.attempt_flee(attacker, defender, rng);
                out.effects.push(Effect::Flee { succeeded });
                let entry = if succeeded {
                    LogEntry::phase("{actor} escapes the fight")
                } else {
                    LogEntry::action("{actor} fails to escape")
                };
                out.entries.push(entry.actor(&attacker.name));
                ActionMarker::Flee
            }
        };

        Ok(ActionResult {
            actor: attacker.id,
            effects: out.effects,
            entries: out.entries,
            combo: combo_after,
            marker,
            speed_tier,
            evaded,
        })
    }

    fn lookup(&self, id: &TechniqueId) -> Result<&'a Technique, ActionRejected> {
        self.catalog
            .get(id.as_str())
            .ok_or_else(|| ActionRejected::UnknownTechnique(id.clone()))
    }

    /// Returns whether the damaging part was evaded.
    fn resolve_technique(
        &self,
        technique: &Technique,
        attacker: &Combatant,
        defender: Option<&Combatant>,
        combo: &ComboState,
        rng: &mut (impl RandomSource + ?Sized),
        out: &mut Outcome,
    ) -> Result<bool, ActionRejected> {
        let mut action_entry = LogEntry::action("{actor} uses {technique}")
            .actor(&attacker.name)
            .technique(&technique.name);
        if technique.needs_target() {
            if let Some(defender) = defender {
                action_entry = LogEntry::action("{actor} uses {technique} on {target}")
                    .actor(&attacker.name)
                    .technique(&technique.name)
                    .target(&defender.name);
            }
        }
        out.entries.push(action_entry);

        if technique.chi_cost > 0 {
            out.effects.push(Effect::SpendChi {
                who: attacker.id,
                amount: technique.chi_cost,
            });
        }

        if technique.has(EffectTags::CLEANSE) && !attacker.status_effects().is_empty() {
            out.effects.push(Effect::ClearStatuses { target: attacker.id });
            out.entries.push(
                LogEntry::status("{actor} is cleansed of {amount} effects")
                    .actor(&attacker.name)
                    .amount(attacker.status_effects().len() as i64),
            );
        }

        let mut evaded = false;
        if technique.needs_target() {
            let defender = defender.ok_or(ActionRejected::NoTarget)?;
            if technique.is_damaging() {
                let chain = ComboTracker::finisher_chain_length(combo, technique);
                evaded = self.strike(technique.power, Some(technique), chain, attacker, defender, rng, out);
            }
            if !evaded {
                self.on_hit_riders(technique, attacker, defender, out);
            }
        }

        if technique.heal_percent > 0 {
            let wanted = (attacker.hp.max() as u64 * technique.heal_percent as u64 + 50) / 100;
            let amount = (wanted.min(u32::MAX as u64) as u32).min(attacker.hp.room());
            out.effects.push(Effect::Heal {
                target: attacker.id,
                amount,
            });
            out.entries.push(
                LogEntry::heal("{actor} recovers {amount} HP ({remaining} HP)")
                    .actor(&attacker.name)
                    .amount(amount)
                    .remaining(attacker.hp.current() + amount),
            );
        }

        for application in technique.applies.iter().filter(|a| a.target == EffectTarget::User) {
            out.effects.push(Effect::ApplyStatus {
                target: attacker.id,
                effect: application.effect.clone(),
            });
            out.entries.push(status_entry(&attacker.name, &application.effect.name, application.effect.duration));
        }

        if technique.has(EffectTags::SELF_GUARD) {
            out.effects.push(Effect::SetDefending { target: attacker.id });
            out.entries.push(LogEntry::status("{actor} guards").actor(&attacker.name));
        }

        if technique.has(EffectTags::CRIT_SETUP) {
            out.effects.push(Effect::PrimeCrit { target: attacker.id });
            out.entries.push(LogEntry::status("{actor} focuses for a critical strike").actor(&attacker.name));
        }

        Ok(evaded)
    }

    fn on_hit_riders(&self, technique: &Technique, attacker: &Combatant, defender: &Combatant, out: &mut Outcome) {
        if technique.has(EffectTags::CHI_STEAL) {
            let amount = self.config.chi_steal_amount.min(defender.chi.current());
            if amount > 0 {
                out.effects.push(Effect::TransferChi {
                    from: defender.id,
                    to: attacker.id,
                    amount,
                });
                out.entries.push(
                    LogEntry::status("{actor} steals {amount} chi from {target}")
                        .actor(&attacker.name)
                        .target(&defender.name)
                        .amount(amount),
                );
            }
        }

        if technique.has(EffectTags::KNOCKBACK) {
            out.effects.push(Effect::Stagger { target: defender.id });
            out.entries.push(LogEntry::status("{target} is knocked back").target(&defender.name));
        }

        for application in technique.applies.iter().filter(|a| a.target == EffectTarget::Opponent) {
            out.effects.push(Effect::ApplyStatus {
                target: defender.id,
                effect: application.effect.clone(),
            });
            out.entries.push(status_entry(&defender.name, &application.effect.name, application.effect.duration));
        }
    }

    /// Rolls evasion and emits the hits. Returns `true` if evaded.
    #[allow(clippy::too_many_arguments)]
    fn strike(
        &self,
        power: u32,
        technique: Option<&Technique>,
        finisher_chain: usize,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut (impl RandomSource + ?Sized),
        out: &mut Outcome,
    ) -> bool {
        let evasion = evasion_percent(defender, self.config);
        if evasion > 0 && compare::check_chance(evasion as f64 / 100.0, rng) {
            out.entries.push(
                LogEntry::action("{target} evades {actor}'s attack")
                    .actor(&attacker.name)
                    .target(&defender.name),
            );
            return true;
        }

        let attack = effective_stat(attacker, StatKind::Attack, self.config);
        let defense = effective_stat(defender, StatKind::Defense, self.config);
        let mut base = base_damage(power, attack, defense);

        let critical = attacker.crit_primed;
        if critical {
            base = apply_percent(base, self.config.crit_multiplier_percent as i32 - 100).max(1);
            out.effects.push(Effect::ConsumeCrit { target: attacker.id });
        }

        let stages = DamageStages {
            conditional: technique.map_or(0, |t| conditional_bonus(t, attacker, defender)),
            combo: self.config.combo_bonus(finisher_chain) as i32,
            reactive: technique.map_or(0, |t| reactive_bonus(t, attacker)),
            mitigation: if defender.defending {
                self.config.defend_mitigation_percent as i32
            } else {
                0
            },
        };
        let per_hit = stages.apply(base);
        tracing::debug!(
            attacker = %attacker.id,
            defender = %defender.id,
            base,
            per_hit,
            ?stages,
            "damage computed"
        );

        let hits = technique.map_or(1, Technique::hit_count);
        let mut remaining = defender.hp.current();
        for _ in 0..hits {
            remaining = remaining.saturating_sub(per_hit);
            out.effects.push(Effect::Damage {
                target: defender.id,
                amount: per_hit,
                critical,
            });
            out.entries.push(
                LogEntry::damage(if critical { CRITICAL_HIT } else { HIT })
                    .actor(&attacker.name)
                    .target(&defender.name)
                    .amount(per_hit)
                    .remaining(remaining),
            );
            if remaining == 0 {
                break;
            }
        }
        false
    }

    fn attempt_flee(
        &self,
        runner: &Combatant,
        fastest_opponent: Option<&Combatant>,
        rng: &mut (impl RandomSource + ?Sized),
    ) -> bool {
        let config = self.config;
        let chance = match fastest_opponent {
            Some(opponent) => {
                let mine = effective_stat(runner, StatKind::Speed, config) as f64;
                let theirs = effective_stat(opponent, StatKind::Speed, config) as f64;
                config.flee_base_chance + (mine - theirs) * config.flee_speed_factor
            }
            None => config.flee_base_chance,
        };
        let chance = compare::clamp(chance, config.flee_min_chance, config.flee_max_chance);
        let succeeded = compare::check_chance(chance, rng);
        tracing::debug!(runner = %runner.id, chance, succeeded, "flee attempt");
        succeeded
    }
}

fn check_target(
    attacker: &Combatant,
    defender: Option<&Combatant>,
    target: CombatantId,
) -> Result<(), ActionRejected> {
    let defender = defender.ok_or(ActionRejected::NoTarget)?;
    if defender.id != target || defender.is_defeated() || !defender.is_opponent_of(attacker) {
        return Err(ActionRejected::InvalidTarget(target));
    }
    Ok(())
}

/// Resource bonuses read `self` as the attacker and `opponent` as the defender.
fn conditional_bonus(technique: &Technique, attacker: &Combatant, defender: &Combatant) -> i32 {
    if !technique.has(EffectTags::CONDITIONAL_BONUS) {
        return 0;
    }
    technique
        .bonuses
        .iter()
        .filter_map(|bonus| match &bonus.when {
            BonusCondition::TargetResource(cond) if ConditionParser::evaluate_pair(attacker, defender, cond) => {
                Some(bonus.percent)
            }
            _ => None,
        })
        .sum()
}

fn reactive_bonus(technique: &Technique, attacker: &Combatant) -> i32 {
    if !technique.has(EffectTags::CONDITIONAL_BONUS) || attacker.damage_taken_since_turn == 0 {
        return 0;
    }
    technique
        .bonuses
        .iter()
        .filter(|bonus| bonus.when == BonusCondition::UserWasHit)
        .map(|bonus| bonus.percent)
        .sum()
}

fn status_entry(target: &str, effect: &str, duration: i32) -> LogEntry {
    LogEntry::status("{target} is affected by {label} for {amount} rounds")
        .target(target)
        .label(effect)
        .amount(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::CompareOp;
    use crate::condition::{ResourceCondition, Subject};
    use crate::rng::FixedRolls;
    use crate::state::{BaseStats, StatusEffect};
    use crate::technique::ComboRole;

    fn catalog() -> TechniqueCatalog {
        TechniqueCatalog::from_techniques([
            Technique::new("swift-palm", 12)
                .with_tier(SpeedTier::Light)
                .with_role(ComboRole::Starter),
            Technique::new("river-step", 10).with_role(ComboRole::Link),
            Technique::new("falling-star", 20)
                .with_role(ComboRole::Finisher)
                .with_chi_cost(10),
            Technique::new("petal-flurry", 4).with_hits(3),
            Technique::new("leech-strike", 8).with_tags(EffectTags::CHI_STEAL | EffectTags::KNOCKBACK),
            Technique::new("executioner", 10).with_bonus(
                BonusCondition::TargetResource(ResourceCondition::hp_percent(Subject::Opponent, CompareOp::Lt, 50.0)),
                50,
            ),
            Technique::new("last-stand", 10).with_bonus(
                BonusCondition::TargetResource(ResourceCondition::hp_percent(Subject::User, CompareOp::Lt, 30.0)),
                50,
            ),
            Technique::new("retort", 10).with_bonus(BonusCondition::UserWasHit, 30),
            Technique::new("gather", 0)
                .healing(25)
                .with_tags(EffectTags::CRIT_SETUP | EffectTags::CLEANSE | EffectTags::SELF_GUARD),
            Technique::new("weaken", 0).applying(
                EffectTarget::Opponent,
                StatusEffect::modifier("weakened", StatKind::Attack, -20, 2),
            ),
        ])
        .unwrap()
    }

    fn player() -> Combatant {
        Combatant::player("Mei", BaseStats::new(10, 10, 10, 10)).with_techniques([
            "swift-palm",
            "river-step",
            "falling-star",
            "petal-flurry",
            "leech-strike",
            "executioner",
            "last-stand",
            "retort",
            "gather",
            "weaken",
        ])
    }

    fn bandit() -> Combatant {
        Combatant::enemy(1, "Bandit", BaseStats::new(10, 10, 10, 0)).with_hp(50, 50)
    }

    fn run(action: CombatAction, attacker: &Combatant, defender: &Combatant, combo: &ComboState) -> ActionResult {
        let config = BalanceConfig::default();
        let catalog = catalog();
        let resolver = ActionResolver::new(&config, &catalog);
        resolver
            .resolve(&action, attacker, Some(defender), combo, &mut FixedRolls::new(vec![0.99]))
            .unwrap()
    }

    fn use_on(id: &str, target: &Combatant) -> CombatAction {
        CombatAction::technique(id, target.id)
    }

    #[test]
    fn light_technique_deals_scaled_damage_and_opens_chain() {
        let enemy = bandit();
        let result = run(use_on("swift-palm", &enemy), &player(), &enemy, &ComboState::default());

        assert_eq!(result.total_damage(), 12);
        assert_eq!(result.speed_tier, SpeedTier::Light);
        assert!(result.combo.active);
        assert_eq!(result.combo.len(), 1);
    }

    #[test]
    fn finisher_gets_chain_bonus() {
        let enemy = bandit().with_hp(200, 200);
        let chain = ComboState {
            chain: vec!["swift-palm".into(), "river-step".into()],
            active: true,
        };
        let result = run(use_on("falling-star", &enemy), &player(), &enemy, &chain);

        // 20 × (1 + 30%)
        assert_eq!(result.total_damage(), 26);
        assert!(!result.combo.active);
        assert_eq!(result.combo.len(), 3);
        assert!(result.effects.contains(&Effect::SpendChi {
            who: CombatantId::PLAYER,
            amount: 10
        }));
    }

    #[test]
    fn defending_target_takes_reduced_damage() {
        let mut enemy = bandit();
        enemy.defending = true;
        let result = run(
            CombatAction::BasicAttack { target: enemy.id },
            &player(),
            &enemy,
            &ComboState::default(),
        );
        assert_eq!(result.total_damage(), 5);
    }

    #[test]
    fn multi_hit_emits_one_entry_per_hit() {
        let enemy = bandit();
        let result = run(use_on("petal-flurry", &enemy), &player(), &enemy, &ComboState::default());
        let hits = result
            .entries
            .iter()
            .filter(|e| e.kind == crate::log::LogKind::Damage)
            .count();
        assert_eq!(hits, 3);
        assert_eq!(result.total_damage(), 12);
    }

    #[test]
    fn conditional_and_reactive_bonuses() {
        let healthy = bandit();
        let wounded = bandit().with_hp(20, 50);
        let me = player();

        assert_eq!(run(use_on("executioner", &healthy), &me, &healthy, &ComboState::default()).total_damage(), 10);
        assert_eq!(run(use_on("executioner", &wounded), &me, &wounded, &ComboState::default()).total_damage(), 15);

        let mut hurt = player();
        hurt.damage_taken_since_turn = 7;
        assert_eq!(run(use_on("retort", &healthy), &me, &healthy, &ComboState::default()).total_damage(), 10);
        assert_eq!(run(use_on("retort", &healthy), &hurt, &healthy, &ComboState::default()).total_damage(), 13);
    }

    #[test]
    fn self_bonus_tracks_the_attacker() {
        let healthy = bandit();
        let wounded = bandit().with_hp(10, 50);
        let desperate = player().with_hp(20, 100);

        assert_eq!(run(use_on("last-stand", &healthy), &desperate, &healthy, &ComboState::default()).total_damage(), 15);
        // A wounded target does not trigger a bonus about the user.
        assert_eq!(run(use_on("last-stand", &wounded), &player(), &wounded, &ComboState::default()).total_damage(), 10);
    }

    #[test]
    fn chi_steal_is_limited_by_target_chi() {
        let enemy = bandit().with_chi(4, 50);
        let result = run(use_on("leech-strike", &enemy), &player(), &enemy, &ComboState::default());
        assert!(result.effects.contains(&Effect::TransferChi {
            from: enemy.id,
            to: CombatantId::PLAYER,
            amount: 4
        }));
        assert!(result.effects.contains(&Effect::Stagger { target: enemy.id }));
    }

    #[test]
    fn primed_critical_is_consumed() {
        let enemy = bandit();
        let mut me = player();
        me.crit_primed = true;
        let result = run(CombatAction::BasicAttack { target: enemy.id }, &me, &enemy, &ComboState::default());

        assert_eq!(result.total_damage(), 15);
        assert!(result.effects.contains(&Effect::ConsumeCrit { target: me.id }));
    }

    #[test]
    fn self_technique_heals_cleanses_guards_and_primes() {
        let enemy = bandit();
        let me = player()
            .with_hp(40, 100)
            .with_effect(StatusEffect::modifier("weakened", StatKind::Attack, -20, 2));
        let result = run(use_on("gather", &enemy), &me, &enemy, &ComboState::default());

        assert_eq!(
            result.effects,
            vec![
                Effect::ClearStatuses { target: me.id },
                Effect::Heal {
                    target: me.id,
                    amount: 25
                },
                Effect::SetDefending { target: me.id },
                Effect::PrimeCrit { target: me.id },
            ]
        );
        assert_eq!(result.total_damage(), 0);
    }

    #[test]
    fn evaded_attack_resets_chain_and_skips_riders() {
        let config = BalanceConfig::default();
        let catalog = catalog();
        let resolver = ActionResolver::new(&config, &catalog);
        let enemy = bandit().with_effect(StatusEffect::modifier("mist", StatKind::Evasion, 50, 2));
        let chain = ComboState {
            chain: vec!["swift-palm".into()],
            active: true,
        };

        let result = resolver
            .resolve(
                &use_on("leech-strike", &enemy),
                &player(),
                Some(&enemy),
                &chain,
                &mut FixedRolls::new(vec![0.1]),
            )
            .unwrap();

        assert!(result.evaded);
        assert_eq!(result.total_damage(), 0);
        assert_eq!(result.combo, ComboState::default());
        assert!(!result.effects.iter().any(|e| matches!(e, Effect::Stagger { .. })));
    }

    #[test]
    fn illegal_actions_are_rejected() {
        let config = BalanceConfig::default();
        let catalog = catalog();
        let resolver = ActionResolver::new(&config, &catalog);
        let me = player().with_chi(0, 50);
        let enemy = bandit();
        let ally = Combatant::player("Twin", BaseStats::default());

        assert_eq!(
            resolver.validate(&use_on("falling-star", &enemy), &me, Some(&enemy)),
            Err(ActionRejected::Unusable(UseDenied::InsufficientChi {
                needed: 10,
                available: 0
            }))
        );
        assert_eq!(
            resolver.validate(&use_on("moonfall", &enemy), &me, Some(&enemy)),
            Err(ActionRejected::UnknownTechnique("moonfall".into()))
        );
        assert_eq!(
            resolver.validate(&CombatAction::BasicAttack { target: ally.id }, &me, Some(&ally)),
            Err(ActionRejected::InvalidTarget(ally.id))
        );
        assert_eq!(
            resolver.validate(&CombatAction::ChangeStance(Stance::Flowing), &me, None),
            Err(ActionRejected::AlreadyInStance(Stance::Flowing))
        );
        assert_eq!(
            resolver.validate(&CombatAction::BasicAttack { target: enemy.id }, &me, None),
            Err(ActionRejected::NoTarget)
        );
        // self-only techniques need no target
        assert!(resolver.validate(&use_on("gather", &enemy), &me, None).is_ok());
    }

    #[test]
    fn flee_chance_follows_relative_speed() {
        let config = BalanceConfig::default();
        let catalog = catalog();
        let resolver = ActionResolver::new(&config, &catalog);
        let me = player();
        let even = bandit();
        let fast = Combatant::enemy(2, "Wolf", BaseStats::new(10, 10, 40, 0));
        let combo = ComboState::default();

        let attempt = |opponent: &Combatant, roll: f64| {
            resolver
                .resolve(&CombatAction::Flee, &me, Some(opponent), &combo, &mut FixedRolls::new(vec![roll]))
                .unwrap()
                .flee()
        };

        assert_eq!(attempt(&even, 0.49), Some(true));
        assert_eq!(attempt(&even, 0.5), Some(false));
        // effective speed 12 vs 46: 0.5 - 34 × 0.02 falls below the 0.05 floor
        assert_eq!(attempt(&fast, 0.06), Some(false));
        assert_eq!(attempt(&fast, 0.04), Some(true));
    }
}
