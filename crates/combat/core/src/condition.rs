//! Textual resource conditions such as `"hp < 30%"` or
//! `"opponent hp below 40% of max hp"`.
//!
//! Conditions are parsed once, at data-load time, into [`ResourceCondition`].
//! A malformed string is a diagnostic and the caller treats the condition as
//! "not met".

use thiserror::Error;

use crate::compare::CompareOp;
use crate::config::HpThresholds;
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{Combatant, Gauge};

/// Whose resources a condition reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Subject {
    /// The evaluating combatant (`self`).
    #[default]
    User,
    Opponent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Resource {
    Hp,
    Chi,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Threshold {
    /// Percentage of the resource maximum.
    Percent(f64),
    /// Absolute value.
    Raw(f64),
}

/// `<subject> <resource> <op> <threshold>`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCondition {
    pub subject: Subject,
    pub resource: Resource,
    pub op: CompareOp,
    pub threshold: Threshold,
}

impl ResourceCondition {
    pub fn hp_percent(subject: Subject, op: CompareOp, percent: f64) -> Self {
        Self {
            subject,
            resource: Resource::Hp,
            op,
            threshold: Threshold::Percent(percent),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConditionParseError {
    #[error("empty condition")]
    Empty,

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    #[error("unexpected '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("trailing input starting at '{0}'")]
    TrailingInput(String),
}

impl CombatError for ConditionParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "CONDITION_EMPTY",
            Self::UnexpectedEnd { .. } => "CONDITION_UNEXPECTED_END",
            Self::UnexpectedToken { .. } => "CONDITION_UNEXPECTED_TOKEN",
            Self::InvalidCharacter(_) => "CONDITION_INVALID_CHARACTER",
            Self::InvalidNumber(_) => "CONDITION_INVALID_NUMBER",
            Self::UnknownOperator(_) => "CONDITION_UNKNOWN_OPERATOR",
            Self::TrailingInput(_) => "CONDITION_TRAILING_INPUT",
        }
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Word(String),
    Number(f64),
    Percent,
    Op(String),
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Number(n) => write!(f, "{n}"),
            Token::Percent => f.write_str("%"),
            Token::Op(op) => f.write_str(op),
        }
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ConditionParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Word(input[start..end].to_ascii_lowercase()));
        } else if c.is_ascii_digit() || c == '.' {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    end = i + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &input[start..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| ConditionParseError::InvalidNumber(text.to_string()))?;
            tokens.push(Token::Number(value));
        } else if c == '%' {
            chars.next();
            tokens.push(Token::Percent);
        } else if matches!(c, '<' | '>' | '=' | '!') {
            let mut end = start;
            while let Some(&(i, c)) = chars.peek() {
                if matches!(c, '<' | '>' | '=' | '!') {
                    end = i + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Op(input[start..end].to_string()));
        } else {
            return Err(ConditionParseError::InvalidCharacter(c));
        }
    }

    Ok(tokens)
}

pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek_word(&self) -> Option<&'a str> {
        match self.peek() {
            Some(Token::Word(w)) => Some(w.as_str()),
            _ => None,
        }
    }

    /// Consumes the next token if it is the word `word`.
    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.peek(), Some(Token::Op(o)) if o == op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_word(&mut self, expected: &'static str) -> Result<&'a str, ConditionParseError> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w.as_str()),
            Some(other) => Err(ConditionParseError::UnexpectedToken {
                found: other.to_string(),
                expected,
            }),
            None => Err(ConditionParseError::UnexpectedEnd { expected }),
        }
    }

    pub(crate) fn expect_number(&mut self) -> Result<f64, ConditionParseError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(*n),
            Some(other) => Err(ConditionParseError::UnexpectedToken {
                found: other.to_string(),
                expected: "a number",
            }),
            None => Err(ConditionParseError::UnexpectedEnd { expected: "a number" }),
        }
    }

    /// Comparison operator as a symbol or one of `below`, `under`, `above`, `over`.
    pub(crate) fn expect_compare(&mut self) -> Result<CompareOp, ConditionParseError> {
        const EXPECTED: &str = "a comparison operator";
        match self.next() {
            Some(Token::Op(symbol)) => {
                CompareOp::from_symbol(symbol).ok_or_else(|| ConditionParseError::UnknownOperator(symbol.clone()))
            }
            Some(Token::Word(w)) => match w.as_str() {
                "below" | "under" => Ok(CompareOp::Lt),
                "above" | "over" => Ok(CompareOp::Gt),
                _ => Err(ConditionParseError::UnknownOperator(w.clone())),
            },
            Some(other) => Err(ConditionParseError::UnexpectedToken {
                found: other.to_string(),
                expected: EXPECTED,
            }),
            None => Err(ConditionParseError::UnexpectedEnd { expected: EXPECTED }),
        }
    }

    pub(crate) fn finish(&self) -> Result<(), ConditionParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ConditionParseError::TrailingInput(token.to_string())),
        }
    }
}

pub(crate) fn subject_word(word: &str) -> Option<Subject> {
    match word {
        "self" | "me" | "user" => Some(Subject::User),
        "opponent" | "target" | "enemy" => Some(Subject::Opponent),
        _ => None,
    }
}

pub(crate) fn resource_word(word: &str) -> Option<Resource> {
    match word {
        "hp" | "health" => Some(Resource::Hp),
        "chi" => Some(Resource::Chi),
        _ => None,
    }
}

/// Parses `<resource> <op> <number>[%] [of max <resource>]` after the subject.
pub(crate) fn parse_resource_tail(
    subject: Subject,
    cursor: &mut Cursor<'_>,
) -> Result<ResourceCondition, ConditionParseError> {
    let word = cursor.expect_word("'hp' or 'chi'")?;
    let resource = resource_word(word).ok_or_else(|| ConditionParseError::UnexpectedToken {
        found: word.to_string(),
        expected: "'hp' or 'chi'",
    })?;

    let op = cursor.expect_compare()?;
    let value = cursor.expect_number()?;
    let threshold = if matches!(cursor.peek(), Some(Token::Percent)) {
        cursor.next();
        Threshold::Percent(value)
    } else {
        Threshold::Raw(value)
    };

    // "of max hp" is decoration.
    if cursor.eat_word("of") {
        cursor.eat_word("max");
        if cursor.peek_word().and_then(resource_word).is_some() {
            cursor.next();
        }
    }

    Ok(ResourceCondition {
        subject,
        resource,
        op,
        threshold,
    })
}

// ============================================================================
// Parser
// ============================================================================

/// Parses and evaluates resource conditions.
pub struct ConditionParser;

impl ConditionParser {
    /// Parses a full resource condition. The subject defaults to `self`.
    pub fn parse(text: &str) -> Result<ResourceCondition, ConditionParseError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(ConditionParseError::Empty);
        }
        let mut cursor = Cursor::new(&tokens);
        let subject = match cursor.peek_word().and_then(subject_word) {
            Some(subject) => {
                cursor.next();
                subject
            }
            None => Subject::User,
        };
        let condition = parse_resource_tail(subject, &mut cursor)?;
        cursor.finish()?;
        Ok(condition)
    }

    /// Like [`parse`](Self::parse) but logs the failure and returns `None`.
    pub fn parse_lenient(text: &str) -> Option<ResourceCondition> {
        match Self::parse(text) {
            Ok(condition) => Some(condition),
            Err(error) => {
                tracing::warn!(condition = text, %error, "malformed condition treated as not met");
                None
            }
        }
    }

    /// Evaluates `condition` against `combatant`, ignoring the subject.
    pub fn evaluate(combatant: &Combatant, condition: &ResourceCondition) -> bool {
        let gauge = match condition.resource {
            Resource::Hp => &combatant.hp,
            Resource::Chi => &combatant.chi,
        };
        let (actual, threshold) = measure(gauge, condition.threshold);
        condition.op.apply(actual, threshold)
    }

    /// Evaluates `condition`, picking `user` or `opponent` by subject.
    pub fn evaluate_pair(user: &Combatant, opponent: &Combatant, condition: &ResourceCondition) -> bool {
        match condition.subject {
            Subject::User => Self::evaluate(user, condition),
            Subject::Opponent => Self::evaluate(opponent, condition),
        }
    }

    pub fn is_low_hp(combatant: &Combatant, thresholds: &HpThresholds) -> bool {
        combatant.hp.percent() < thresholds.low
    }

    pub fn is_high_hp(combatant: &Combatant, thresholds: &HpThresholds) -> bool {
        combatant.hp.percent() > thresholds.high
    }

    pub fn is_critical_hp(combatant: &Combatant, thresholds: &HpThresholds) -> bool {
        combatant.hp.percent() < thresholds.critical
    }
}

fn measure(gauge: &Gauge, threshold: Threshold) -> (f64, f64) {
    match threshold {
        Threshold::Percent(p) => (gauge.percent(), p),
        Threshold::Raw(v) => (gauge.current() as f64, v),
    }
}
