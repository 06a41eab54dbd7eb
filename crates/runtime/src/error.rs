//! Error types for the runtime layer.

use std::path::PathBuf;

use combat_core::{EncounterError, EngineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Content directory or embedded data failed to load.
    #[error("failed to load content: {0:#}")]
    Content(anyhow::Error),

    #[error("failed to read scenario {path}")]
    ScenarioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario")]
    ScenarioParse(#[source] ron::error::SpannedError),

    #[error("scenario player script step '{step}' is invalid: {reason}")]
    InvalidScriptStep { step: String, reason: String },

    #[error("scenario enemy id {0} is reserved for the player")]
    ReservedEnemyId(u8),

    #[error("scenario lists {0} enemies, more than there are combatant ids")]
    TooManyEnemies(usize),

    #[error("autopilot pattern '{0}' is not in the content bundle")]
    UnknownAutopilotPattern(String),

    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("failed to encode session report")]
    Report(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
