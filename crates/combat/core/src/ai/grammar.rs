//! Rule condition grammar.
//!
//! ```text
//! cond    := term ("and" term)*
//! term    := ("not" | "!") term | atom
//! atom    := "default"
//!          | "turn" op NUMBER
//!          | "turn" "%" NUMBER ("==" | "=") NUMBER
//!          | [subject] ("hp" | "chi") op NUMBER ["%"] ["of" "max" WORD]
//!          | subject "has" WORD
//!          | "opponent" ("defending" | "stunned" | "used" "heavy")
//! ```

use crate::compare::{self, CompareOp};
use crate::condition::{
    ConditionParseError, ConditionParser, Cursor, ResourceCondition, Subject, Token, parse_resource_tail,
    subject_word, tokenize,
};

use super::AiView;

/// A compiled rule condition.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// Always matches.
    Default,
    Resource(ResourceCondition),
    /// The acting combatant's own 1-based turn number.
    Turn { op: CompareOp, value: f64 },
    TurnModulo { divisor: i64, remainder: i64 },
    OpponentDefending,
    OpponentStunned,
    OpponentUsedHeavy,
    HasStatus { subject: Subject, name: String },
    Not(Box<Condition>),
    All(Vec<Condition>),
}

impl Condition {
    pub fn parse(text: &str) -> Result<Self, ConditionParseError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(ConditionParseError::Empty);
        }
        let mut cursor = Cursor::new(&tokens);
        let condition = parse_and(&mut cursor)?;
        cursor.finish()?;
        Ok(condition)
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn evaluate(&self, view: &AiView<'_>) -> bool {
        match self {
            Self::Default => true,
            Self::Resource(cond) => ConditionParser::evaluate_pair(view.me, view.opponent, cond),
            Self::Turn { op, value } => op.apply(view.turn as f64, *value),
            Self::TurnModulo { divisor, remainder } => compare::check_modulo(view.turn as i64, *divisor, *remainder),
            Self::OpponentDefending => view.opponent.defending,
            Self::OpponentStunned => view.opponent.is_stunned(),
            Self::OpponentUsedHeavy => view.opponent.used_heavy_last_turn(),
            Self::HasStatus { subject, name } => match subject {
                Subject::User => view.me.has_status(name),
                Subject::Opponent => view.opponent.has_status(name),
            },
            Self::Not(inner) => !inner.evaluate(view),
            Self::All(parts) => parts.iter().all(|c| c.evaluate(view)),
        }
    }
}

fn parse_and(cursor: &mut Cursor<'_>) -> Result<Condition, ConditionParseError> {
    let mut parts = vec![parse_term(cursor)?];
    while cursor.eat_word("and") {
        parts.push(parse_term(cursor)?);
    }
    Ok(if parts.len() == 1 {
        parts.remove(0)
    } else {
        Condition::All(parts)
    })
}

fn parse_term(cursor: &mut Cursor<'_>) -> Result<Condition, ConditionParseError> {
    if cursor.eat_word("not") || cursor.eat_op("!") {
        return Ok(Condition::Not(Box::new(parse_term(cursor)?)));
    }
    parse_atom(cursor)
}

fn parse_atom(cursor: &mut Cursor<'_>) -> Result<Condition, ConditionParseError> {
    const EXPECTED: &str = "a condition";

    let Some(word) = cursor.peek_word() else {
        return Err(match cursor.peek() {
            Some(token) => ConditionParseError::UnexpectedToken {
                found: token.to_string(),
                expected: EXPECTED,
            },
            None => ConditionParseError::UnexpectedEnd { expected: EXPECTED },
        });
    };

    match word {
        "default" => {
            cursor.next();
            Ok(Condition::Default)
        }
        "turn" => {
            cursor.next();
            parse_turn(cursor)
        }
        "hp" | "health" | "chi" => Ok(Condition::Resource(parse_resource_tail(Subject::User, cursor)?)),
        _ => {
            let Some(subject) = subject_word(word) else {
                return Err(ConditionParseError::UnexpectedToken {
                    found: word.to_string(),
                    expected: EXPECTED,
                });
            };
            cursor.next();
            parse_subject_tail(subject, cursor)
        }
    }
}

fn parse_turn(cursor: &mut Cursor<'_>) -> Result<Condition, ConditionParseError> {
    if matches!(cursor.peek(), Some(Token::Percent)) {
        cursor.next();
        let divisor = cursor.expect_number()?;
        if !(cursor.eat_op("==") || cursor.eat_op("=")) {
            return Err(match cursor.peek() {
                Some(token) => ConditionParseError::UnexpectedToken {
                    found: token.to_string(),
                    expected: "'=='",
                },
                None => ConditionParseError::UnexpectedEnd { expected: "'=='" },
            });
        }
        let remainder = cursor.expect_number()?;
        return Ok(Condition::TurnModulo {
            divisor: divisor as i64,
            remainder: remainder as i64,
        });
    }

    let op = cursor.expect_compare()?;
    let value = cursor.expect_number()?;
    Ok(Condition::Turn { op, value })
}

fn parse_subject_tail(subject: Subject, cursor: &mut Cursor<'_>) -> Result<Condition, ConditionParseError> {
    match (subject, cursor.peek_word()) {
        (_, Some("has")) => {
            cursor.next();
            let name = cursor.expect_word("a status effect name")?;
            Ok(Condition::HasStatus {
                subject,
                name: name.to_string(),
            })
        }
        (Subject::Opponent, Some("defending")) => {
            cursor.next();
            Ok(Condition::OpponentDefending)
        }
        (Subject::Opponent, Some("stunned")) => {
            cursor.next();
            Ok(Condition::OpponentStunned)
        }
        (Subject::Opponent, Some("used")) => {
            cursor.next();
            let word = cursor.expect_word("'heavy'")?;
            if word != "heavy" {
                return Err(ConditionParseError::UnexpectedToken {
                    found: word.to_string(),
                    expected: "'heavy'",
                });
            }
            Ok(Condition::OpponentUsedHeavy)
        }
        _ => Ok(Condition::Resource(parse_resource_tail(subject, cursor)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionMarker;
    use crate::state::{BaseStats, Combatant, StatusEffect};
    use crate::technique::TechniqueId;

    fn pair() -> (Combatant, Combatant) {
        (
            Combatant::enemy(1, "Wolf", BaseStats::default()),
            Combatant::player("Mei", BaseStats::default()),
        )
    }

    #[test]
    fn parses_every_form() {
        assert_eq!(Condition::parse("default").unwrap(), Condition::Default);
        assert_eq!(
            Condition::parse("turn % 3 == 0").unwrap(),
            Condition::TurnModulo { divisor: 3, remainder: 0 }
        );
        assert_eq!(
            Condition::parse("turn >= 4").unwrap(),
            Condition::Turn {
                op: CompareOp::Ge,
                value: 4.0
            }
        );
        assert_eq!(Condition::parse("opponent used heavy").unwrap(), Condition::OpponentUsedHeavy);
        assert_eq!(
            Condition::parse("!opponent defending").unwrap(),
            Condition::Not(Box::new(Condition::OpponentDefending))
        );
        assert_eq!(
            Condition::parse("self has iron-skin").unwrap(),
            Condition::HasStatus {
                subject: Subject::User,
                name: "iron-skin".into()
            }
        );
        assert!(matches!(
            Condition::parse("hp < 50% and not self has focus").unwrap(),
            Condition::All(parts) if parts.len() == 2
        ));
    }

    #[test]
    fn rejects_malformed_conditions() {
        assert!(Condition::parse("").is_err());
        assert!(Condition::parse("self defending").is_err());
        assert!(Condition::parse("opponent used light").is_err());
        assert!(Condition::parse("turn % 3 > 0").is_err());
        assert!(Condition::parse("and").is_err());
        assert!(Condition::parse("sometimes").is_err());
    }

    #[test]
    fn evaluates_flags_and_turns() {
        let (me, mut opponent) = pair();
        opponent.defending = true;
        opponent.last_action = Some(ActionMarker::Technique {
            id: TechniqueId::from("mountain-fist"),
            heavy: true,
        });
        let view = AiView {
            me: &me,
            opponent: &opponent,
            turn: 6,
        };

        assert!(Condition::parse("opponent defending").unwrap().evaluate(&view));
        assert!(Condition::parse("opponent used heavy").unwrap().evaluate(&view));
        assert!(!Condition::parse("opponent stunned").unwrap().evaluate(&view));
        assert!(Condition::parse("turn % 3 == 0").unwrap().evaluate(&view));
        assert!(!Condition::parse("turn % 4 == 0").unwrap().evaluate(&view));
        assert!(Condition::parse("turn > 5 and opponent defending").unwrap().evaluate(&view));
    }

    #[test]
    fn has_status_checks_the_right_combatant() {
        let (me, opponent) = pair();
        let me = me.with_effect(StatusEffect::marker("focus", 2));
        let view = AiView {
            me: &me,
            opponent: &opponent,
            turn: 1,
        };

        assert!(Condition::parse("self has focus").unwrap().evaluate(&view));
        assert!(!Condition::parse("opponent has focus").unwrap().evaluate(&view));
        assert!(Condition::parse("not opponent has focus").unwrap().evaluate(&view));
    }
}
