use combat_core::{
    AiLibrary, AiPattern, BalanceConfig, BaseStats, CombatAction, CombatEngine, CombatEnv, Combatant, CombatantId,
    ComboRole, Encounter, FixedRolls, LogKind, Outcome, PcgRng, PlayerPrompt, RuleSpec, SpeedTier, StatKind,
    StatusEffect, Step, Technique, TechniqueCatalog,
};

struct Content {
    catalog: TechniqueCatalog,
    patterns: AiLibrary,
    config: BalanceConfig,
}

impl Content {
    fn new() -> Self {
        let catalog = TechniqueCatalog::from_techniques([
            Technique::new("open-palm", 8).with_role(ComboRole::Starter).with_tier(SpeedTier::Light),
            Technique::new("crane-hook", 8).with_role(ComboRole::Link),
            Technique::new("dragon-fist", 10)
                .with_role(ComboRole::Finisher)
                .with_tier(SpeedTier::Heavy)
                .with_chi_cost(10),
        ])
        .unwrap();
        let patterns = [
            AiPattern::compile("brute", [RuleSpec::new("default", "basic-attack", 0)]),
            // Both rules are broken; the pattern still fights.
            AiPattern::compile(
                "confused",
                [
                    RuleSpec::new("hp <> 30%", "defend", 10),
                    RuleSpec::new("turn > 1", "use:moonfall", 5),
                ],
            ),
        ]
        .into_iter()
        .collect();
        Self {
            catalog,
            patterns,
            config: BalanceConfig::default(),
        }
    }

    fn env(&self) -> CombatEnv<'_> {
        CombatEnv::new(&self.catalog, &self.patterns, &self.config)
    }
}

fn player() -> Combatant {
    Combatant::player("Mei", BaseStats::new(10, 10, 20, 10)).with_techniques(["open-palm", "crane-hook", "dragon-fist"])
}

fn enemy(id: u8, pattern: &str) -> Combatant {
    Combatant::enemy(id, "Bandit", BaseStats::new(10, 10, 10, 0)).with_pattern(pattern)
}

/// Starter, link, finisher, then starter again.
fn combo_script(prompt: &PlayerPrompt, combatants: &[Combatant]) -> Option<CombatAction> {
    let target = *prompt.targets.first()?;
    let me = combatants.iter().find(|c| c.id == prompt.actor)?;
    let id = match me.turns_taken % 3 {
        0 => "open-palm",
        1 => "crane-hook",
        _ if prompt.usable_techniques.iter().any(|t| t.as_str() == "dragon-fist") => "dragon-fist",
        _ => "open-palm",
    };
    Some(CombatAction::technique(id, target))
}

#[test]
fn finisher_lands_with_chain_bonus() {
    let content = Content::new();
    let encounter = Encounter::new(player(), vec![enemy(1, "brute").with_hp(200, 200)]);
    let mut engine = CombatEngine::new(content.env(), encounter, FixedRolls::new(vec![])).unwrap();

    for id in ["open-palm", "crane-hook", "dragon-fist"] {
        let Step::AwaitingPlayer(prompt) = engine.step().unwrap() else {
            panic!("encounter ended early");
        };
        engine
            .submit_player_action(CombatAction::technique(id, prompt.targets[0]))
            .unwrap();
    }

    // 8 + 8, then 10 with a +30% bonus for two chained techniques.
    let enemy = engine.combatant(CombatantId(1)).unwrap();
    assert_eq!(enemy.hp.current(), 200 - 8 - 8 - 13);
    let combo = engine.combo(CombatantId::PLAYER).unwrap();
    assert!(!combo.active);
    assert_eq!(combo.len(), 3);
    // The only round ended while the player's chi was still full.
    assert_eq!(engine.rounds_completed(), 1);
    assert_eq!(engine.player().chi.current(), 40);
}

#[test]
fn end_check_is_idempotent() {
    let content = Content::new();
    let encounter = Encounter::new(player(), vec![enemy(1, "brute").with_hp(20, 20)]);
    let mut engine = CombatEngine::new(content.env(), encounter, FixedRolls::new(vec![])).unwrap();

    let mut script = combo_script;
    let result = engine.run(&mut script).unwrap();
    assert_eq!(result.outcome, Outcome::Victory);

    let entries = engine.log().len();
    assert_eq!(engine.check_end_conditions(), Some(Outcome::Victory));
    assert_eq!(engine.check_end_conditions(), Some(Outcome::Victory));
    assert_eq!(engine.log().len(), entries);

    let Step::Finished(again) = engine.step().unwrap() else {
        panic!("a finished encounter stays finished");
    };
    assert_eq!(again, result);
    assert_eq!(
        engine.submit_player_action(CombatAction::Defend),
        Err(combat_core::ActionRejected::EncounterFinished)
    );
    assert_eq!(engine.log().len(), entries);
}

#[test]
fn seeded_runs_replay_identically() {
    let content = Content::new();
    let fight = |seed: u64| {
        let blur = StatusEffect::modifier("blur", StatKind::Evasion, 35, 99);
        let encounter = Encounter::new(
            player(),
            vec![
                enemy(1, "brute").with_effect(blur.clone()),
                enemy(2, "brute").with_effect(blur),
            ],
        );
        let mut engine = CombatEngine::new(content.env(), encounter, PcgRng::seeded(seed)).unwrap();
        let mut script = combo_script;
        let result = engine.run(&mut script).unwrap();
        (result, engine.log().digest())
    };

    let (first, first_digest) = fight(7);
    let (second, second_digest) = fight(7);
    assert_eq!(first, second);
    assert_eq!(hex::encode(first_digest), hex::encode(second_digest));
}

#[test]
fn broken_patterns_fall_back_and_report() {
    let content = Content::new();
    let encounter = Encounter::new(player(), vec![enemy(1, "confused").with_hp(30, 30)]);
    let mut engine = CombatEngine::new(content.env(), encounter, FixedRolls::new(vec![])).unwrap();

    let mut script = combo_script;
    let result = engine.run(&mut script).unwrap();
    assert_eq!(result.outcome, Outcome::Victory);

    let diagnostics: Vec<String> = engine.log().diagnostics().map(|e| e.render()).collect();
    assert!(diagnostics.iter().any(|d| d.contains("no default rule")), "{diagnostics:?}");
    assert!(diagnostics.iter().any(|d| d.contains("falling back to basic attack")));
    assert!(engine.log().gameplay().all(|e| e.kind != LogKind::Diagnostic));
    // The enemy attacked instead of stalling.
    assert!(result.damage_taken > 0);
}

#[test]
fn two_enemies_must_both_fall() {
    let content = Content::new();
    let encounter = Encounter::new(
        player(),
        vec![enemy(1, "brute").with_hp(15, 15), enemy(2, "brute").with_hp(15, 15)],
    );
    let mut engine = CombatEngine::new(content.env(), encounter, FixedRolls::new(vec![])).unwrap();

    let mut script = combo_script;
    let result = engine.run(&mut script).unwrap();
    assert_eq!(result.outcome, Outcome::Victory);
    assert!(result.combatants.iter().filter(|c| !c.is_player()).all(Combatant::is_defeated));
    assert_eq!(result.damage_dealt, 30);
    assert!(engine.scheduler().contains(CombatantId::PLAYER));
    assert_eq!(engine.scheduler().len(), 1);
}

#[test]
fn unwinnable_tutorial_ends_in_scripted_victory() {
    let content = Content::new();
    let giant = Combatant::enemy(1, "Old Master", BaseStats::new(40, 200, 30, 0)).with_pattern("brute");
    let encounter = Encounter::new(player(), vec![giant]).with_scripted_victory();
    let mut engine = CombatEngine::new(content.env(), encounter, PcgRng::seeded(1)).unwrap();

    let mut script = combo_script;
    let result = engine.run(&mut script).unwrap();
    assert_eq!(result.outcome, Outcome::Victory);
    assert_eq!(result.player().map(|p| p.hp.current()), Some(1));
    assert!(engine.log().gameplay().any(|e| e.render() == "Mei refuses to fall"));
}

#[test]
fn faster_combatant_takes_proportionally_more_turns() {
    let content = Content::new();
    let sloth = Combatant::enemy(1, "Sloth", BaseStats::new(1, 200, 10, 0))
        .with_hp(10_000, 10_000)
        .with_pattern("brute");
    // Player speed 23 (dex 20, flowing +15%), enemy 12.
    let tank = player().with_hp(10_000, 10_000);
    let mut engine = CombatEngine::new(content.env(), Encounter::new(tank, vec![sloth]), FixedRolls::new(vec![])).unwrap();

    let mut player_turns = 0u32;
    while player_turns < 230 {
        let Step::AwaitingPlayer(_) = engine.step().unwrap() else {
            panic!("nobody should fall");
        };
        engine.submit_player_action(CombatAction::Defend).unwrap();
        player_turns += 1;
    }
    let enemy_turns = engine.combatant(CombatantId(1)).unwrap().turns_taken;
    assert!((118..=122).contains(&enemy_turns), "enemy took {enemy_turns} turns");
}
