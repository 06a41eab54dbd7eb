//! Encounter state machine.
//!
//! [`CombatEngine`] owns every combatant for the duration of a fight. It asks
//! the [`TurnScheduler`] who acts, lets the AI pick enemy actions, waits for
//! the caller to [`submit_player_action`](CombatEngine::submit_player_action)
//! on player turns, applies [`ActionResolver`] results and keeps round
//! bookkeeping (status ticks and chi regeneration).
//!
//! # Driving
//!
//! ```rust,ignore
//! let mut engine = CombatEngine::new(env, encounter, PcgRng::seeded(7))?;
//! loop {
//!     match engine.step()? {
//!         Step::AwaitingPlayer(prompt) => engine.submit_player_action(choose(&prompt))?,
//!         Step::Finished(result) => break result,
//!     }
//! }
//! ```
//!
//! # Rounds
//!
//! A round completes once every living combatant has acted at least once
//! since the previous round ended. At that point every living combatant's
//! status effects tick and chi regenerates.

mod apply;
mod encounter;
mod input;
mod outcome;

pub use encounter::{CombatEnv, Encounter, EncounterError};
pub use input::PlayerInput;
pub use outcome::{CombatPhase, CombatResult, Outcome, PlayerPrompt, Step};

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::action::CombatAction;
use crate::ai::{AiDecisionEngine, AiView};
use crate::combat::{ActionRejected, ActionResolver, ActionResult, damage};
use crate::combo::ComboState;
use crate::error::{CombatError, ErrorSeverity};
use crate::log::{CombatLog, LogEntry};
use crate::rng::RandomSource;
use crate::scheduler::{Pace, SchedulerError, TurnScheduler};
use crate::state::{Combatant, CombatantId, StatKind};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] ActionRejected),

    #[error("scheduler failure: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("player input ended before the encounter finished")]
    InputExhausted,

    #[error("gave up after {0} rejected player actions in a row")]
    TooManyRejections(u32),
}

impl CombatError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Rejected(inner) => inner.severity(),
            Self::Scheduler(_) => ErrorSeverity::Internal,
            Self::InputExhausted | Self::TooManyRejections(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Rejected(inner) => inner.error_code(),
            Self::Scheduler(_) => "ENGINE_SCHEDULER",
            Self::InputExhausted => "ENGINE_INPUT_EXHAUSTED",
            Self::TooManyRejections(_) => "ENGINE_TOO_MANY_REJECTIONS",
        }
    }
}

/// Single-encounter combat engine.
pub struct CombatEngine<'a, R: RandomSource> {
    env: CombatEnv<'a>,
    /// Player first, then enemies in encounter order.
    combatants: Vec<Combatant>,
    combos: BTreeMap<CombatantId, ComboState>,
    scheduler: TurnScheduler,
    phase: CombatPhase,
    log: CombatLog,
    rng: R,

    can_lose: bool,
    scripted_victory: bool,
    fled: bool,

    current: Option<CombatantId>,
    /// Current turn does not consume meter.
    current_is_free: bool,
    /// Enemy granted an immediate action by a failed flee.
    pending_free_action: Option<CombatantId>,

    acted_this_round: BTreeSet<CombatantId>,
    turns_elapsed: u32,
    rounds_completed: u32,
    damage_dealt: u32,
    damage_taken: u32,
}

impl<'a, R: RandomSource> CombatEngine<'a, R> {
    pub fn new(env: CombatEnv<'a>, encounter: Encounter, rng: R) -> Result<Self, EncounterError> {
        encounter.validate(env.patterns)?;

        let Encounter {
            player,
            enemies,
            can_lose,
            scripted_victory,
        } = encounter;

        let mut combatants = Vec::with_capacity(enemies.len() + 1);
        combatants.push(player);
        combatants.extend(enemies);

        let mut scheduler = TurnScheduler::new(env.config.scheduler_threshold, env.config.carry_overflow);
        let mut combos = BTreeMap::new();
        for c in &combatants {
            scheduler.add(c.id);
            combos.insert(c.id, ComboState::default());
        }

        let mut log = CombatLog::new();
        let mut reported = BTreeSet::new();
        for pattern_id in combatants.iter().filter_map(|c| c.ai_pattern.as_deref()) {
            if !reported.insert(pattern_id) {
                continue;
            }
            if let Some(pattern) = env.patterns.get(pattern_id) {
                log.extend(pattern.diagnostics().iter().map(|d| LogEntry::diagnostic(d.clone())));
            }
        }
        log.push(
            LogEntry::phase("{actor} faces {amount} foes")
                .actor(&combatants[0].name)
                .amount(combatants.len() as i64 - 1),
        );

        tracing::info!(
            player = %combatants[0].name,
            enemies = combatants.len() - 1,
            can_lose,
            "encounter started"
        );

        Ok(Self {
            env,
            combatants,
            combos,
            scheduler,
            phase: CombatPhase::AdvancingScheduler,
            log,
            rng,
            can_lose,
            scripted_victory,
            fled: false,
            current: None,
            current_is_free: false,
            pending_free_action: None,
            acted_this_round: BTreeSet::new(),
            turns_elapsed: 0,
            rounds_completed: 0,
            damage_dealt: 0,
            damage_taken: 0,
        })
    }

    // ===== accessors =====

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn player(&self) -> &Combatant {
        &self.combatants[0]
    }

    pub fn combo(&self, id: CombatantId) -> Option<&ComboState> {
        self.combos.get(&id)
    }

    pub fn current_actor(&self) -> Option<CombatantId> {
        self.current
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    /// Final report, once the encounter has finished.
    pub fn result(&self) -> Option<CombatResult> {
        let outcome = self.phase.outcome()?;
        Some(CombatResult {
            outcome,
            turns_elapsed: self.turns_elapsed,
            rounds_completed: self.rounds_completed,
            damage_dealt: self.damage_dealt,
            damage_taken: self.damage_taken,
            combatants: self.combatants.clone(),
        })
    }

    /// Hands back combatants and log, e.g. for persistence.
    pub fn into_parts(self) -> (Vec<Combatant>, CombatLog) {
        (self.combatants, self.log)
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    // ===== driving =====

    /// Runs enemy turns until the player must act or the fight ends.
    pub fn step(&mut self) -> Result<Step, EngineError> {
        loop {
            match self.phase {
                CombatPhase::Finished(_) => {
                    return self
                        .result()
                        .map(Step::Finished)
                        .ok_or(EngineError::Rejected(ActionRejected::EncounterFinished));
                }
                CombatPhase::AwaitingPlayerAction => return Ok(Step::AwaitingPlayer(self.prompt())),
                CombatPhase::AdvancingScheduler => self.advance_scheduler()?,
                CombatPhase::AwaitingEnemyAction => self.take_enemy_turn(),
                CombatPhase::CheckingEndConditions => {
                    if self.check_end_conditions().is_none() {
                        self.phase = CombatPhase::AdvancingScheduler;
                    }
                }
                // Resolution happens inside a single call and never rests here.
                CombatPhase::ResolvingPlayerAction | CombatPhase::ResolvingEnemyAction => {
                    self.phase = CombatPhase::CheckingEndConditions;
                }
            }
        }
    }

    /// Resolves the player's action. On rejection nothing changes and the
    /// engine keeps waiting for input.
    pub fn submit_player_action(&mut self, action: CombatAction) -> Result<(), ActionRejected> {
        match self.phase {
            CombatPhase::AwaitingPlayerAction => {}
            CombatPhase::Finished(_) => return Err(ActionRejected::EncounterFinished),
            _ => return Err(ActionRejected::NotAwaitingInput),
        }
        let actor = self.current.ok_or(ActionRejected::NotAwaitingInput)?;

        let result = self.resolve(actor, &action)?;
        self.phase = CombatPhase::ResolvingPlayerAction;
        let failed_flee = result.flee() == Some(false);
        self.finish_action(&result);

        if failed_flee && self.env.config.flee_failure_free_action {
            self.pending_free_action = self.fastest_living_enemy();
        }
        self.phase = CombatPhase::CheckingEndConditions;
        Ok(())
    }

    /// Drives the fight to the end, pulling player actions from `input`.
    pub fn run(&mut self, input: &mut impl PlayerInput) -> Result<CombatResult, EngineError> {
        let mut rejected = 0u32;
        loop {
            match self.step()? {
                Step::Finished(result) => return Ok(result),
                Step::AwaitingPlayer(prompt) => {
                    let action = input
                        .choose(&prompt, &self.combatants)
                        .ok_or(EngineError::InputExhausted)?;
                    match self.submit_player_action(action) {
                        Ok(()) => rejected = 0,
                        Err(reason) => {
                            tracing::debug!(%reason, "player action rejected");
                            input.rejected(&reason);
                            rejected += 1;
                            if rejected >= self.env.config.max_rejected_inputs.max(1) {
                                return Err(EngineError::TooManyRejections(rejected));
                            }
                        }
                    }
                }
            }
        }
    }

    /// Evaluates victory/defeat/flee. Calling it again without a new action
    /// changes nothing.
    pub fn check_end_conditions(&mut self) -> Option<Outcome> {
        if let CombatPhase::Finished(outcome) = self.phase {
            return Some(outcome);
        }

        // Non-lethal floor before anyone is removed.
        let mut scripted_win = false;
        if !self.can_lose && self.combatants[0].is_defeated() {
            self.combatants[0].hp.set(1);
            let name = self.combatants[0].name.clone();
            self.log.push(LogEntry::phase("{actor} refuses to fall").actor(name));
            scripted_win = self.scripted_victory;
        }

        let defeated: Vec<(CombatantId, String)> = self
            .combatants
            .iter()
            .filter(|c| c.is_defeated())
            .map(|c| (c.id, c.name.clone()))
            .collect();
        for (id, name) in defeated {
            if self.scheduler.remove(id) {
                self.acted_this_round.remove(&id);
                self.log.push(LogEntry::phase("{target} is defeated").target(name));
            }
        }

        let enemies_down = self.combatants.iter().filter(|c| !c.is_player()).all(Combatant::is_defeated);
        let outcome = if self.fled {
            Some(Outcome::Fled)
        } else if enemies_down || scripted_win {
            Some(Outcome::Victory)
        } else if self.combatants[0].is_defeated() {
            Some(Outcome::Defeat)
        } else {
            None
        }?;

        self.phase = CombatPhase::Finished(outcome);
        self.current = None;
        self.log.push(LogEntry::phase("The encounter ends: {label}").label(outcome.to_string()));
        tracing::info!(%outcome, turns = self.turns_elapsed, rounds = self.rounds_completed, "encounter finished");
        Some(outcome)
    }

    // ===== internals =====

    fn paces(&self) -> Vec<Pace> {
        self.combatants
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| Pace {
                id: c.id,
                gain: damage::effective_stat(c, StatKind::Speed, self.env.config),
                raw_speed: c.stats.dexterity,
                is_player: c.is_player(),
                staggered: c.staggered,
            })
            .collect()
    }

    fn sync_meters(&mut self) {
        for c in self.combatants.iter_mut() {
            c.turn_meter = self.scheduler.meter(c.id).unwrap_or(0);
        }
    }

    fn advance_scheduler(&mut self) -> Result<(), EngineError> {
        let (actor, free) = match self.pending_free_action.take() {
            Some(enemy) if self.combatant(enemy).is_some_and(Combatant::is_alive) => (enemy, true),
            _ => {
                let paces = self.paces();
                let advance = self.scheduler.advance(&paces)?;
                if advance.ticks > 0 {
                    for c in self.combatants.iter_mut() {
                        c.staggered = false;
                    }
                }
                self.sync_meters();
                (advance.actor, false)
            }
        };

        self.current = Some(actor);
        self.current_is_free = free;

        let Some(c) = self.combatant_mut(actor) else {
            return Err(EngineError::Scheduler(SchedulerError::NoCombatants));
        };
        c.defending = false;
        let is_player = c.is_player();
        let name = c.name.clone();

        let template = if free {
            "{actor} seizes a free action"
        } else {
            "{actor}'s turn"
        };
        self.log.push(LogEntry::phase(template).actor(name));

        self.phase = if is_player {
            CombatPhase::AwaitingPlayerAction
        } else {
            CombatPhase::AwaitingEnemyAction
        };
        Ok(())
    }

    fn take_enemy_turn(&mut self) {
        let Some(actor) = self.current else {
            self.phase = CombatPhase::AdvancingScheduler;
            return;
        };
        let action = self.enemy_action(actor);
        self.phase = CombatPhase::ResolvingEnemyAction;

        let result = match self.resolve(actor, &action) {
            Ok(result) => Some(result),
            Err(reason) => {
                let message = format!("{actor} could not {}: {reason}; attacking instead", action.label());
                tracing::warn!("{message}");
                self.log.push(LogEntry::diagnostic(message));
                let fallback = CombatAction::BasicAttack {
                    target: CombatantId::PLAYER,
                };
                self.resolve(actor, &fallback)
                    .or_else(|_| self.resolve(actor, &CombatAction::Defend))
                    .ok()
            }
        };
        if let Some(result) = result {
            self.finish_action(&result);
        }
        self.phase = CombatPhase::CheckingEndConditions;
    }

    fn enemy_action(&mut self, actor: CombatantId) -> CombatAction {
        let player_target = CombatAction::BasicAttack {
            target: CombatantId::PLAYER,
        };
        let Some(me) = self.combatant(actor) else {
            return player_target;
        };
        let Some(pattern) = me.ai_pattern.as_deref().and_then(|id| self.env.patterns.get(id)) else {
            return player_target;
        };

        let view = AiView {
            me,
            opponent: self.player(),
            turn: me.turns_taken + 1,
        };
        let decision = AiDecisionEngine::decide(pattern, &view, self.env.catalog);
        let diagnostics = decision.diagnostics;
        let action = decision.action;
        self.log.extend(diagnostics.into_iter().map(LogEntry::diagnostic));
        action
    }

    /// Resolves without touching engine state (only the RNG advances).
    fn resolve(&mut self, actor: CombatantId, action: &CombatAction) -> Result<ActionResult, ActionRejected> {
        let attacker = self
            .combatants
            .iter()
            .find(|c| c.id == actor)
            .filter(|c| c.is_alive())
            .ok_or(ActionRejected::NotActing(actor))?;

        let defender = match action {
            CombatAction::Flee => fastest_living_opponent(&self.combatants, attacker, self.env),
            _ => action
                .target()
                .and_then(|id| self.combatants.iter().find(|c| c.id == id)),
        };
        let combo = self.combos.get(&actor).cloned().unwrap_or_default();

        ActionResolver::new(self.env.config, self.env.catalog).resolve(action, attacker, defender, &combo, &mut self.rng)
    }

    /// Applies a result and does the per-action bookkeeping.
    fn finish_action(&mut self, result: &ActionResult) {
        let actor = result.actor;
        self.apply_result(result);

        self.combos.insert(actor, result.combo.clone());
        if let Some(c) = self.combatant_mut(actor) {
            c.last_action = Some(result.marker.clone());
            c.turns_taken += 1;
            c.damage_taken_since_turn = 0;
        }
        if !self.current_is_free {
            let cost = self.env.config.tier_costs.cost(result.speed_tier);
            self.scheduler.consume_turn(actor, cost);
            self.sync_meters();
        }
        self.turns_elapsed += 1;
        self.acted_this_round.insert(actor);

        self.maybe_complete_round();
    }

    fn maybe_complete_round(&mut self) {
        let everyone_acted = self
            .combatants
            .iter()
            .filter(|c| c.is_alive())
            .all(|c| self.acted_this_round.contains(&c.id));
        if !everyone_acted {
            return;
        }

        self.rounds_completed += 1;
        self.acted_this_round.clear();
        self.log.push(LogEntry::phase("Round {amount} ends").amount(self.rounds_completed));

        let config = self.env.config;
        let mut entries = Vec::new();
        for c in self.combatants.iter_mut().filter(|c| c.is_alive()) {
            for expired in c.status_effects.tick() {
                entries.push(
                    LogEntry::status("{target}'s {label} wears off")
                        .target(&c.name)
                        .label(expired.name),
                );
            }
            let regen = damage::chi_regen(c, config);
            c.chi.fill(regen);
        }
        self.log.extend(entries);
        tracing::debug!(round = self.rounds_completed, "round completed");
    }

    fn fastest_living_enemy(&self) -> Option<CombatantId> {
        fastest_living_opponent(&self.combatants, self.player(), self.env).map(|c| c.id)
    }

    fn prompt(&self) -> PlayerPrompt {
        let player = self.player();
        let standard = self.env.config.tier_costs.standard;
        let mut shadow = self.scheduler.clone();
        shadow.consume_turn(player.id, standard);
        let lookahead = shadow.preview_next(self.env.config.lookahead, &self.paces(), standard);

        PlayerPrompt {
            actor: player.id,
            turn: player.turns_taken + 1,
            lookahead,
            usable_techniques: self.env.catalog.usable_by(player).map(|t| t.id.clone()).collect(),
            targets: self
                .combatants
                .iter()
                .filter(|c| !c.is_player() && c.is_alive())
                .map(|c| c.id)
                .collect(),
        }
    }
}

/// Highest effective speed among living opponents; lowest id on ties.
fn fastest_living_opponent<'c>(
    combatants: &'c [Combatant],
    of: &Combatant,
    env: CombatEnv<'_>,
) -> Option<&'c Combatant> {
    combatants
        .iter()
        .filter(|c| c.is_alive() && c.is_opponent_of(of))
        .min_by_key(|c| {
            (
                core::cmp::Reverse(damage::effective_stat(c, StatKind::Speed, env.config)),
                c.id,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiLibrary, AiPattern, RuleSpec};
    use crate::config::BalanceConfig;
    use crate::rng::FixedRolls;
    use crate::state::BaseStats;
    use crate::technique::{Technique, TechniqueCatalog};

    struct Fixture {
        catalog: TechniqueCatalog,
        patterns: AiLibrary,
        config: BalanceConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: TechniqueCatalog::from_techniques([Technique::new("jab", 10)]).unwrap(),
                patterns: [AiPattern::compile("brute", [RuleSpec::new("default", "basic-attack", 0)])]
                    .into_iter()
                    .collect(),
                config: BalanceConfig::default(),
            }
        }

        fn env(&self) -> CombatEnv<'_> {
            CombatEnv::new(&self.catalog, &self.patterns, &self.config)
        }
    }

    fn encounter(player_dex: u32, enemy_dex: u32) -> Encounter {
        Encounter::new(
            Combatant::player("Mei", BaseStats::new(10, 10, player_dex, 10)).with_techniques(["jab"]),
            vec![Combatant::enemy(1, "Bandit", BaseStats::new(10, 10, enemy_dex, 0)).with_pattern("brute")],
        )
    }

    #[test]
    fn faster_player_is_prompted_first() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();

        let Step::AwaitingPlayer(prompt) = engine.step().unwrap() else {
            panic!("expected a player prompt");
        };
        assert_eq!(prompt.targets, vec![CombatantId(1)]);
        assert_eq!(prompt.usable_techniques, vec!["jab".into()]);
        assert_eq!(prompt.lookahead.len(), fx.config.lookahead);
        assert_eq!(engine.turns_elapsed(), 0);
    }

    fn turn_order(log: &CombatLog) -> Vec<CombatantId> {
        log.gameplay()
            .filter_map(|e| match e.render().as_str() {
                "Mei's turn" => Some(CombatantId::PLAYER),
                "Bandit's turn" => Some(CombatantId(1)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn lookahead_matches_turns_under_custom_tier_cost() {
        let mut fx = Fixture::new();
        fx.config.tier_costs.standard = 50;
        let mut engine = CombatEngine::new(fx.env(), encounter(26, 10), FixedRolls::new(vec![])).unwrap();

        let Step::AwaitingPlayer(prompt) = engine.step().unwrap() else {
            panic!("expected a player prompt");
        };
        let predicted: Vec<CombatantId> = prompt.lookahead.iter().map(|e| e.id).collect();
        assert_eq!(predicted.len(), fx.config.lookahead);

        let seen = turn_order(engine.log()).len();
        while turn_order(engine.log()).len() < seen + predicted.len() {
            engine.submit_player_action(CombatAction::Defend).unwrap();
            let Step::AwaitingPlayer(_) = engine.step().unwrap() else {
                panic!("nobody should fall");
            };
        }
        let actual = turn_order(engine.log())[seen..seen + predicted.len()].to_vec();
        assert_eq!(predicted, actual);
    }

    #[test]
    fn slower_player_waits_for_enemy_turn() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(10, 20), FixedRolls::new(vec![])).unwrap();

        assert!(matches!(engine.step().unwrap(), Step::AwaitingPlayer(_)));
        assert_eq!(engine.turns_elapsed(), 1);
        assert!(engine.player().hp.current() < 100);
    }

    #[test]
    fn rejected_action_changes_nothing() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();
        engine.step().unwrap();

        let before_log = engine.log().len();
        let before = engine.combatants().to_vec();
        let err = engine
            .submit_player_action(CombatAction::technique("moonfall", CombatantId(1)))
            .unwrap_err();

        assert_eq!(err, ActionRejected::UnknownTechnique("moonfall".into()));
        assert_eq!(engine.phase(), CombatPhase::AwaitingPlayerAction);
        assert_eq!(engine.log().len(), before_log);
        assert_eq!(engine.combatants(), &before[..]);
    }

    #[test]
    fn submit_outside_player_turn_is_refused() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();
        assert_eq!(
            engine.submit_player_action(CombatAction::Defend),
            Err(ActionRejected::NotAwaitingInput)
        );
    }

    #[test]
    fn round_ends_after_everyone_acts() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();

        engine.step().unwrap();
        engine.submit_player_action(CombatAction::Defend).unwrap();
        assert_eq!(engine.rounds_completed(), 0);

        // Player is twice as fast: acts again before the bandit.
        engine.step().unwrap();
        engine.submit_player_action(CombatAction::Defend).unwrap();
        assert_eq!(engine.rounds_completed(), 0);

        engine.step().unwrap();
        assert_eq!(engine.rounds_completed(), 1);
    }

    #[test]
    fn defend_lasts_until_own_next_turn() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();
        engine.step().unwrap();
        engine.submit_player_action(CombatAction::Defend).unwrap();
        assert!(engine.player().defending);

        engine.step().unwrap();
        assert!(!engine.player().defending);
    }

    #[test]
    fn cannot_lose_floors_player_hp() {
        let fx = Fixture::new();
        let mut encounter = encounter(10, 20).cannot_lose();
        encounter.player = encounter.player.with_hp(1, 100);
        let mut engine = CombatEngine::new(fx.env(), encounter, FixedRolls::new(vec![])).unwrap();

        assert!(matches!(engine.step().unwrap(), Step::AwaitingPlayer(_)));
        assert_eq!(engine.player().hp.current(), 1);
        assert!(engine.scheduler().contains(CombatantId::PLAYER));
    }

    #[test]
    fn scripted_victory_ends_on_player_knockout() {
        let fx = Fixture::new();
        let mut encounter = encounter(10, 20).with_scripted_victory();
        encounter.player = encounter.player.with_hp(1, 100);
        let mut engine = CombatEngine::new(fx.env(), encounter, FixedRolls::new(vec![])).unwrap();

        let Step::Finished(result) = engine.step().unwrap() else {
            panic!("expected the scripted ending");
        };
        assert_eq!(result.outcome, Outcome::Victory);
        assert_eq!(result.player().map(|p| p.hp.current()), Some(1));
    }

    #[test]
    fn defeat_when_encounter_can_be_lost() {
        let fx = Fixture::new();
        let mut encounter = encounter(10, 20);
        encounter.player = encounter.player.with_hp(1, 100);
        let mut engine = CombatEngine::new(fx.env(), encounter, FixedRolls::new(vec![])).unwrap();

        let Step::Finished(result) = engine.step().unwrap() else {
            panic!("expected defeat");
        };
        assert_eq!(result.outcome, Outcome::Defeat);
        assert_eq!(result.damage_taken, 1);
        assert!(!engine.scheduler().contains(CombatantId::PLAYER));
    }

    #[test]
    fn run_stops_when_input_runs_out() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();
        let mut nothing = |_: &PlayerPrompt, _: &[Combatant]| None;
        assert_eq!(engine.run(&mut nothing), Err(EngineError::InputExhausted));
    }

    #[test]
    fn run_gives_up_on_endless_rejections() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();
        let mut stubborn = |_: &PlayerPrompt, _: &[Combatant]| Some(CombatAction::technique("moonfall", CombatantId(1)));
        assert_eq!(
            engine.run(&mut stubborn),
            Err(EngineError::TooManyRejections(fx.config.max_rejected_inputs))
        );
    }

    #[test]
    fn run_plays_to_victory() {
        let fx = Fixture::new();
        let mut engine = CombatEngine::new(fx.env(), encounter(20, 10), FixedRolls::new(vec![])).unwrap();
        let mut attack = |prompt: &PlayerPrompt, _: &[Combatant]| {
            prompt.targets.first().map(|t| CombatAction::technique("jab", *t))
        };
        let result = engine.run(&mut attack).unwrap();

        assert_eq!(result.outcome, Outcome::Victory);
        assert_eq!(result.damage_dealt, 100);
        assert!(result.rounds_completed > 0);
        assert!(engine.log().diagnostics().next().is_none());
    }
}
