//! Combat stances.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A combatant's current combat mode.
///
/// Exactly one stance is active per combatant. Modifiers for each stance are
/// injected through [`StanceTable`](crate::config::StanceTable); switching
/// stance costs the combatant's turn.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Stance {
    /// Evasive, quick footwork.
    #[default]
    Flowing,
    /// Rooted and guarded.
    Weathered,
    /// Reckless offense.
    Hungry,
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}
