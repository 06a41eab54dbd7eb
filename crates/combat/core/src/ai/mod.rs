//! Priority-rule AI.
//!
//! An [`AiPattern`] is an ordered list of `condition -> action` rules compiled
//! once from authored [`RuleSpec`]s. [`AiDecisionEngine::decide`] walks the
//! rules from highest to lowest priority and picks the first whose condition
//! holds and whose action is usable right now.
//!
//! Malformed rules never stop a fight: a bad condition never matches, a bad
//! action is skipped, and an exhausted rule list falls back to a basic attack.
//! Each of these produces a diagnostic.

mod grammar;

pub use grammar::Condition;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::action::CombatAction;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{Combatant, Stance};
use crate::technique::{TechniqueCatalog, TechniqueId, UseDenied};

/// A rule as authored: plain strings plus a priority.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleSpec {
    pub condition: String,
    pub action: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
}

impl RuleSpec {
    pub fn new(condition: impl Into<String>, action: impl Into<String>, priority: i32) -> Self {
        Self {
            condition: condition.into(),
            action: action.into(),
            priority,
        }
    }
}

/// Parsed rule action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuleAction {
    UseTechnique(TechniqueId),
    BasicAttack,
    Defend,
    ChangeStance(Stance),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleActionParseError {
    #[error("empty action")]
    Empty,

    #[error("missing technique id after 'use:'")]
    MissingTechnique,

    #[error("unknown stance '{0}'")]
    UnknownStance(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

impl CombatError for RuleActionParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "RULE_ACTION_EMPTY",
            Self::MissingTechnique => "RULE_ACTION_MISSING_TECHNIQUE",
            Self::UnknownStance(_) => "RULE_ACTION_UNKNOWN_STANCE",
            Self::UnknownAction(_) => "RULE_ACTION_UNKNOWN",
        }
    }
}

impl RuleAction {
    /// Parses `use:<id>`, `basic-attack`, `defend` or `stance:<stance>`.
    pub fn parse(text: &str) -> Result<Self, RuleActionParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RuleActionParseError::Empty);
        }
        if let Some(id) = text.strip_prefix("use:") {
            let id = id.trim();
            if id.is_empty() {
                return Err(RuleActionParseError::MissingTechnique);
            }
            return Ok(Self::UseTechnique(TechniqueId::from(id)));
        }
        if let Some(stance) = text.strip_prefix("stance:") {
            let stance = stance.trim();
            return stance
                .parse::<Stance>()
                .map(Self::ChangeStance)
                .map_err(|_| RuleActionParseError::UnknownStance(stance.to_string()));
        }
        match text.to_ascii_lowercase().as_str() {
            "basic-attack" | "attack" => Ok(Self::BasicAttack),
            "defend" => Ok(Self::Defend),
            _ => Err(RuleActionParseError::UnknownAction(text.to_string())),
        }
    }
}

/// A compiled rule. `None` parts failed to parse and never fire.
#[derive(Clone, Debug, PartialEq)]
pub struct AiRule {
    pub condition: Option<Condition>,
    pub action: Option<RuleAction>,
    pub priority: i32,
    pub spec: RuleSpec,
}

/// Rules sorted by descending priority (ties keep authored order).
#[derive(Clone, Debug, PartialEq)]
pub struct AiPattern {
    pub id: String,
    rules: Vec<AiRule>,
    diagnostics: Vec<String>,
}

impl AiPattern {
    /// Compiles authored rules. Parse failures become diagnostics.
    pub fn compile(id: impl Into<String>, specs: impl IntoIterator<Item = RuleSpec>) -> Self {
        let id = id.into();
        let mut diagnostics = Vec::new();
        let mut rules: Vec<AiRule> = specs
            .into_iter()
            .map(|spec| {
                let condition = match Condition::parse(&spec.condition) {
                    Ok(condition) => Some(condition),
                    Err(error) => {
                        diagnostics.push(format!(
                            "pattern '{id}': condition '{}' ignored: {error}",
                            spec.condition
                        ));
                        None
                    }
                };
                let action = match RuleAction::parse(&spec.action) {
                    Ok(action) => Some(action),
                    Err(error) => {
                        diagnostics.push(format!("pattern '{id}': action '{}' ignored: {error}", spec.action));
                        None
                    }
                };
                AiRule {
                    condition,
                    action,
                    priority: spec.priority,
                    spec,
                }
            })
            .collect();

        rules.sort_by_key(|rule| core::cmp::Reverse(rule.priority));

        if !rules.iter().any(|r| matches!(r.condition, Some(Condition::Default))) {
            diagnostics.push(format!("pattern '{id}' has no default rule"));
        }
        for message in &diagnostics {
            tracing::warn!(pattern = %id, "{message}");
        }

        Self { id, rules, diagnostics }
    }

    pub fn rules(&self) -> &[AiRule] {
        &self.rules
    }

    /// Problems found while compiling.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}

/// Compiled patterns by id.
#[derive(Clone, Debug, Default)]
pub struct AiLibrary {
    patterns: BTreeMap<String, AiPattern>,
}

impl AiLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pattern: AiPattern) -> Option<AiPattern> {
        self.patterns.insert(pattern.id.clone(), pattern)
    }

    pub fn get(&self, id: &str) -> Option<&AiPattern> {
        self.patterns.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.patterns.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AiPattern> {
        self.patterns.values()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl FromIterator<AiPattern> for AiLibrary {
    fn from_iter<T: IntoIterator<Item = AiPattern>>(iter: T) -> Self {
        let mut library = Self::new();
        for pattern in iter {
            library.insert(pattern);
        }
        library
    }
}

/// Read-only state an AI decision looks at.
#[derive(Clone, Copy, Debug)]
pub struct AiView<'a> {
    pub me: &'a Combatant,
    pub opponent: &'a Combatant,
    /// The deciding combatant's own 1-based turn number.
    pub turn: u32,
}

/// Selected action and why.
#[derive(Clone, Debug, PartialEq)]
pub struct AiDecision {
    pub action: CombatAction,
    /// Index into [`AiPattern::rules`] of the rule that fired; `None` on fallback.
    pub rule: Option<usize>,
    pub diagnostics: Vec<String>,
}

enum Skip {
    Unusable(UseDenied),
    UnknownTechnique(TechniqueId),
    AlreadyInStance(Stance),
}

pub struct AiDecisionEngine;

impl AiDecisionEngine {
    pub fn decide(pattern: &AiPattern, view: &AiView<'_>, catalog: &TechniqueCatalog) -> AiDecision {
        let mut diagnostics = Vec::new();

        for (index, rule) in pattern.rules.iter().enumerate() {
            let Some(condition) = &rule.condition else {
                continue;
            };
            if !condition.evaluate(view) {
                continue;
            }
            let Some(action) = &rule.action else {
                continue;
            };

            match Self::realize(action, view, catalog) {
                Ok(action) => {
                    tracing::debug!(
                        pattern = %pattern.id,
                        actor = %view.me.id,
                        rule = index,
                        condition = %rule.spec.condition,
                        action = %action.label(),
                        "ai rule selected"
                    );
                    return AiDecision {
                        action,
                        rule: Some(index),
                        diagnostics,
                    };
                }
                Err(Skip::Unusable(reason)) => {
                    tracing::debug!(pattern = %pattern.id, rule = index, %reason, "ai rule skipped");
                }
                Err(Skip::AlreadyInStance(stance)) => {
                    tracing::debug!(pattern = %pattern.id, rule = index, %stance, "ai rule skipped: already in stance");
                }
                Err(Skip::UnknownTechnique(id)) => {
                    let message = format!("pattern '{}': rule {index} uses unknown technique '{id}'", pattern.id);
                    tracing::warn!("{message}");
                    diagnostics.push(message);
                }
            }
        }

        let message = format!(
            "pattern '{}': no usable rule matched for {}, falling back to basic attack",
            pattern.id, view.me.name
        );
        tracing::warn!("{message}");
        diagnostics.push(message);

        AiDecision {
            action: CombatAction::BasicAttack {
                target: view.opponent.id,
            },
            rule: None,
            diagnostics,
        }
    }

    fn realize(action: &RuleAction, view: &AiView<'_>, catalog: &TechniqueCatalog) -> Result<CombatAction, Skip> {
        match action {
            RuleAction::BasicAttack => Ok(CombatAction::BasicAttack {
                target: view.opponent.id,
            }),
            RuleAction::Defend => Ok(CombatAction::Defend),
            RuleAction::ChangeStance(stance) => {
                if view.me.stance == *stance {
                    Err(Skip::AlreadyInStance(*stance))
                } else {
                    Ok(CombatAction::ChangeStance(*stance))
                }
            }
            RuleAction::UseTechnique(id) => {
                let technique = catalog
                    .get(id.as_str())
                    .ok_or_else(|| Skip::UnknownTechnique(id.clone()))?;
                catalog
                    .can_use(
                        technique,
                        view.me.stance,
                        view.me.chi.current(),
                        Some(&view.me.known_techniques),
                    )
                    .map_err(Skip::Unusable)?;
                Ok(CombatAction::Technique {
                    id: id.clone(),
                    target: view.opponent.id,
                })
            }
        }
    }
}
