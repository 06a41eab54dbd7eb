use std::collections::BTreeMap;

use thiserror::Error;

use super::{Technique, TechniqueId};
use crate::error::{CombatError, ErrorSeverity};
use crate::state::{Combatant, Stance};

/// Read-only registry of technique definitions.
///
/// The catalog holds no progression state: which techniques a combatant
/// knows is passed in by the caller.
#[derive(Clone, Debug, Default)]
pub struct TechniqueCatalog {
    techniques: BTreeMap<TechniqueId, Technique>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("technique '{0}' is defined more than once")]
    Duplicate(TechniqueId),
}

impl CombatError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Duplicate(_) => "CATALOG_DUPLICATE",
        }
    }
}

/// Why a technique cannot be used right now.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UseDenied {
    #[error("technique '{0}' is not known")]
    NotKnown(TechniqueId),

    #[error("requires {required} stance (current: {current})")]
    StanceMismatch { required: Stance, current: Stance },

    #[error("needs {needed} chi (has {available})")]
    InsufficientChi { needed: u32, available: u32 },
}

impl TechniqueCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog, rejecting duplicate ids.
    pub fn from_techniques<I>(techniques: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = Technique>,
    {
        let mut catalog = Self::new();
        for technique in techniques {
            catalog.insert(technique)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, technique: Technique) -> Result<(), CatalogError> {
        let technique = technique.normalized();
        if self.techniques.contains_key(&technique.id) {
            return Err(CatalogError::Duplicate(technique.id));
        }
        self.techniques.insert(technique.id.clone(), technique);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Technique> {
        self.techniques.get(&TechniqueId::from(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technique> {
        self.techniques.values()
    }

    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }

    /// Checks stance, chi and (when supplied) known-technique membership.
    pub fn can_use(
        &self,
        technique: &Technique,
        stance: Stance,
        chi: u32,
        known: Option<&[TechniqueId]>,
    ) -> Result<(), UseDenied> {
        if let Some(known) = known {
            if !known.contains(&technique.id) {
                return Err(UseDenied::NotKnown(technique.id.clone()));
            }
        }
        if let super::StanceRequirement::Only(required) = technique.stance {
            if required != stance {
                return Err(UseDenied::StanceMismatch {
                    required,
                    current: stance,
                });
            }
        }
        if chi < technique.chi_cost {
            return Err(UseDenied::InsufficientChi {
                needed: technique.chi_cost,
                available: chi,
            });
        }
        Ok(())
    }

    /// Techniques the combatant knows and can use right now, in id order.
    pub fn usable_by<'a>(&'a self, combatant: &'a Combatant) -> impl Iterator<Item = &'a Technique> + 'a {
        self.techniques.values().filter(move |t| {
            self.can_use(
                t,
                combatant.stance,
                combatant.chi.current(),
                Some(&combatant.known_techniques),
            )
            .is_ok()
        })
    }
}
