//! AI pattern loader.
//!
//! Patterns are compiled as they load. Malformed rules do not fail the load;
//! they surface as pattern diagnostics and are replayed into the combat log
//! when an encounter uses the pattern.

use std::collections::BTreeMap;
use std::path::Path;

use combat_core::{AiLibrary, AiPattern, RuleSpec};

use crate::loaders::{LoadResult, read_file};

pub struct AiPatternLoader;

impl AiPatternLoader {
    /// Load patterns from a RON file.
    ///
    /// RON format: `{ pattern_id: [RuleSpec] }`
    ///
    /// ```ron
    /// {
    ///     "survivor": [
    ///         (condition: "hp < 30%", action: "use:second-wind", priority: 100),
    ///         (condition: "default", action: "basic-attack"),
    ///     ],
    /// }
    /// ```
    pub fn load(path: &Path) -> LoadResult<AiLibrary> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<AiLibrary> {
        let raw: BTreeMap<String, Vec<RuleSpec>> =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse AI pattern RON: {}", e))?;

        Ok(raw
            .into_iter()
            .map(|(id, rules)| AiPattern::compile(id, rules))
            .collect())
    }
}
