//! Numeric comparison and small helpers shared by conditions and AI rules.
//!
//! Nothing here may panic on bad authored data: an unknown operator is a
//! diagnostic and evaluates to `false`.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::rng::RandomSource;

/// Default tolerance for [`approximately_equal`].
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Comparison operator used by conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    #[strum(to_string = "<")]
    #[cfg_attr(feature = "serde", serde(rename = "<"))]
    Lt,
    #[strum(to_string = "<=")]
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Le,
    #[strum(to_string = ">")]
    #[cfg_attr(feature = "serde", serde(rename = ">"))]
    Gt,
    #[strum(to_string = ">=")]
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Ge,
    /// `=` is accepted as an alias when parsing.
    #[strum(to_string = "==", serialize = "=")]
    #[cfg_attr(feature = "serde", serde(rename = "=="))]
    Eq,
    #[strum(to_string = "!=")]
    #[cfg_attr(feature = "serde", serde(rename = "!="))]
    Ne,
}

impl CompareOp {
    /// Parses an operator symbol. `=` is accepted as an alias of `==`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        symbol.parse().ok()
    }

    pub fn symbol(&self) -> &'static str {
        self.into()
    }

    /// Applies the operator as `actual <op> threshold`.
    pub fn apply(&self, actual: f64, threshold: f64) -> bool {
        match self {
            Self::Lt => actual < threshold,
            Self::Le => actual <= threshold,
            Self::Gt => actual > threshold,
            Self::Ge => actual >= threshold,
            Self::Eq => actual == threshold,
            Self::Ne => actual != threshold,
        }
    }
}

/// Evaluates `actual <operator> threshold` from an operator symbol.
///
/// Unknown operators emit a diagnostic and evaluate to `false`.
pub fn evaluate(operator: &str, actual: f64, threshold: f64) -> bool {
    match CompareOp::from_symbol(operator.trim()) {
        Some(op) => op.apply(actual, threshold),
        None => {
            tracing::warn!(operator, "unknown comparison operator, evaluating to false");
            false
        }
    }
}

/// Clamps `value` into `[lo, hi]`. Swapped bounds are reordered.
pub fn clamp<T: PartialOrd>(value: T, lo: T, hi: T) -> T {
    let (lo, hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Inclusive range check.
pub fn is_in_range<T: PartialOrd>(value: T, lo: T, hi: T) -> bool {
    lo <= value && value <= hi
}

/// True when `value % divisor == remainder` (euclidean), used for
/// "every Nth turn" rules. A zero divisor is a diagnostic and yields `false`.
pub fn check_modulo(value: i64, divisor: i64, remainder: i64) -> bool {
    if divisor == 0 {
        tracing::warn!(value, remainder, "modulo check with zero divisor");
        return false;
    }
    value.rem_euclid(divisor) == remainder.rem_euclid(divisor)
}

/// Draws against `probability` using the injected random source.
///
/// Certain outcomes (`<= 0` or `>= 1`) do not consume a draw.
pub fn check_chance(probability: f64, rng: &mut (impl RandomSource + ?Sized)) -> bool {
    if probability.is_nan() || probability <= 0.0 {
        return false;
    }
    if probability >= 1.0 {
        return true;
    }
    rng.next_unit() < probability
}

/// Float comparison with an absolute tolerance.
pub fn approximately_equal(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon.abs()
}
