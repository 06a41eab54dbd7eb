//! Technique catalog loader.

use std::path::Path;

use combat_core::TechniqueCatalog;

use crate::loaders::{LoadResult, read_file};
use crate::spec::TechniqueSpec;

/// Loader for technique catalogs from RON files.
pub struct TechniqueLoader;

impl TechniqueLoader {
    /// Load a catalog from a RON file.
    ///
    /// RON format: `Vec<TechniqueSpec>`
    ///
    /// ```ron
    /// [
    ///     (id: "swift-palm", name: Some("Swift Palm"), power: 12, tier: light, role: starter),
    ///     (id: "second-wind", heal_percent: 30, chi_cost: 15),
    /// ]
    /// ```
    pub fn load(path: &Path) -> LoadResult<(TechniqueCatalog, Vec<String>)> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    /// Parses catalog text. Returns the catalog plus authoring diagnostics.
    pub fn parse(content: &str) -> LoadResult<(TechniqueCatalog, Vec<String>)> {
        let specs: Vec<TechniqueSpec> =
            ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse technique RON: {}", e))?;

        let mut catalog = TechniqueCatalog::new();
        let mut diagnostics = Vec::new();
        for spec in specs {
            let (technique, mut notes) = spec.build();
            diagnostics.append(&mut notes);
            catalog.insert(technique)?;
        }
        Ok((catalog, diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{ComboRole, EffectTags, SpeedTier, StanceRequirement, Stance};

    #[test]
    fn parses_techniques_with_defaults() {
        let (catalog, diagnostics) = TechniqueLoader::parse(
            r#"[
                (id: "swift-palm", name: Some("Swift Palm"), power: 12, tier: light, role: starter),
                (
                    id: "iron-wall",
                    stance: Some(weathered),
                    tags: "SELF_GUARD",
                    applies: [(target: user, effect: (name: "iron skin", duration: 2, stat: Some(defense), magnitude: 30))],
                ),
            ]"#,
        )
        .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(catalog.len(), 2);

        let palm = catalog.get("swift-palm").unwrap();
        assert_eq!(palm.name, "Swift Palm");
        assert_eq!(palm.speed_tier, SpeedTier::Light);
        assert_eq!(palm.combo_role, ComboRole::Starter);
        assert_eq!(palm.hit_count(), 1);

        let wall = catalog.get("iron-wall").unwrap();
        assert_eq!(wall.name, "iron-wall");
        assert_eq!(wall.stance, StanceRequirement::Only(Stance::Weathered));
        assert!(wall.has(EffectTags::SELF_GUARD));
        assert!(!wall.needs_target());
        assert_eq!(wall.applies[0].effect.stacks, 1);
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = TechniqueLoader::parse(r#"[(id: "jab", power: 5), (id: "jab", power: 6)]"#).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn malformed_ron_fails_with_context() {
        let err = TechniqueLoader::parse("[(id: )]").unwrap_err();
        assert!(err.to_string().contains("technique RON"));
    }
}
