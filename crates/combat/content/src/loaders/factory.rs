//! Content factory for building the combat inputs from data files.

use std::path::{Path, PathBuf};

use combat_core::{AiLibrary, BalanceConfig, CombatEnv, RuleAction, TechniqueCatalog};

use crate::loaders::{AiPatternLoader, BalanceLoader, LoadResult, TechniqueLoader};

const TECHNIQUES_FILE: &str = "techniques.ron";
const PATTERNS_FILE: &str = "ai_patterns.ron";
const BALANCE_FILE: &str = "balance.toml";

const EMBEDDED_TECHNIQUES: &str = include_str!("../../data/techniques.ron");
const EMBEDDED_PATTERNS: &str = include_str!("../../data/ai_patterns.ron");
const EMBEDDED_BALANCE: &str = include_str!("../../data/balance.toml");

/// Loads every content file from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── balance.toml      (optional, defaults otherwise)
/// ├── techniques.ron
/// └── ai_patterns.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn load_techniques(&self) -> LoadResult<(TechniqueCatalog, Vec<String>)> {
        TechniqueLoader::load(&self.data_dir.join(TECHNIQUES_FILE))
    }

    pub fn load_patterns(&self) -> LoadResult<AiLibrary> {
        AiPatternLoader::load(&self.data_dir.join(PATTERNS_FILE))
    }

    /// Load `balance.toml`, or the reference values when the file is absent.
    pub fn load_balance(&self) -> LoadResult<BalanceConfig> {
        let path = self.data_dir.join(BALANCE_FILE);
        if path.exists() {
            BalanceLoader::load(&path)
        } else {
            tracing::debug!(path = %path.display(), "no balance file, using defaults");
            Ok(BalanceConfig::default())
        }
    }

    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        let (catalog, diagnostics) = self.load_techniques()?;
        let patterns = self.load_patterns()?;
        let config = self.load_balance()?;
        Ok(ContentBundle::assemble(catalog, patterns, config, diagnostics))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Everything an encounter reads but never changes.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub catalog: TechniqueCatalog,
    pub patterns: AiLibrary,
    pub config: BalanceConfig,
    /// Authoring problems found while loading and cross-checking.
    pub diagnostics: Vec<String>,
}

impl ContentBundle {
    /// The reference data set compiled into this crate.
    pub fn embedded() -> LoadResult<Self> {
        let (catalog, diagnostics) = TechniqueLoader::parse(EMBEDDED_TECHNIQUES)?;
        let patterns = AiPatternLoader::parse(EMBEDDED_PATTERNS)?;
        let config = BalanceLoader::parse(EMBEDDED_BALANCE)?;
        Ok(Self::assemble(catalog, patterns, config, diagnostics))
    }

    fn assemble(catalog: TechniqueCatalog, patterns: AiLibrary, config: BalanceConfig, mut diagnostics: Vec<String>) -> Self {
        for pattern in patterns.iter() {
            diagnostics.extend(pattern.diagnostics().iter().cloned());
            for rule in pattern.rules() {
                if let Some(RuleAction::UseTechnique(id)) = &rule.action {
                    if !catalog.contains(id.as_str()) {
                        let message = format!("pattern '{}' references unknown technique '{id}'", pattern.id);
                        tracing::warn!("{message}");
                        diagnostics.push(message);
                    }
                }
            }
        }
        Self {
            catalog,
            patterns,
            config,
            diagnostics,
        }
    }

    pub fn env(&self) -> CombatEnv<'_> {
        CombatEnv::new(&self.catalog, &self.patterns, &self.config)
    }
}
