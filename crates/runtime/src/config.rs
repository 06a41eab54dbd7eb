//! Runtime configuration read from the process environment.
use std::env;
use std::path::PathBuf;

/// Settings for one simulator run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Content directory; the embedded data set is used when unset.
    pub data_dir: Option<PathBuf>,
    /// Scenario file; the built-in training scenario is used when unset.
    pub scenario: Option<PathBuf>,
    pub seed: u64,
    pub session_id: Option<String>,
    /// Directory for the session log file. No file log when unset.
    pub log_dir: Option<PathBuf>,
    /// Write a file log under the platform cache directory when `log_dir` is unset.
    pub file_log: bool,
    /// Emit the session report as JSON instead of the rendered log.
    pub json: bool,
    /// Play the player with this AI pattern instead of the scenario script.
    pub autopilot: Option<String>,
    /// Print engine diagnostics alongside the gameplay log.
    pub show_diagnostics: bool,
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COMBAT_DATA_DIR` - Content directory (default: embedded content)
    /// - `COMBAT_SCENARIO` - Scenario RON file (default: built-in training yard)
    /// - `COMBAT_SEED` - Random seed (default: 0)
    /// - `COMBAT_SESSION_ID` - Session identifier for log files (default: seed-based)
    /// - `COMBAT_LOG_DIR` - Directory for file logs (default: none)
    /// - `COMBAT_FILE_LOG` - Log to the platform cache directory (default: false)
    /// - `COMBAT_JSON` - Print the report as JSON (default: false)
    /// - `COMBAT_AUTOPILOT` - AI pattern that plays the player (default: none)
    /// - `COMBAT_DIAGNOSTICS` - Include diagnostics in the printed log (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.data_dir = env::var("COMBAT_DATA_DIR").ok().map(PathBuf::from);
        config.scenario = env::var("COMBAT_SCENARIO").ok().map(PathBuf::from);

        if let Some(seed) = read_env::<u64>("COMBAT_SEED") {
            config.seed = seed;
        }

        config.session_id = env::var("COMBAT_SESSION_ID").ok().filter(|id| !id.is_empty());
        config.log_dir = env::var("COMBAT_LOG_DIR").ok().map(PathBuf::from);
        config.file_log = read_env_bool("COMBAT_FILE_LOG");
        config.json = read_env_bool("COMBAT_JSON");
        config.autopilot = env::var("COMBAT_AUTOPILOT").ok().filter(|id| !id.is_empty());
        config.show_diagnostics = read_env_bool("COMBAT_DIAGNOSTICS");

        config
    }

    /// Session id for log files, derived from the seed when not configured.
    pub fn session_id(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| format!("session_{}", self.seed))
    }
}

fn read_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}

/// A flag counts as set when it parses as `true` or is present without a value.
fn read_env_bool(key: &str) -> bool {
    match env::var(key) {
        Ok(value) if value.is_empty() => true,
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => false,
    }
}
