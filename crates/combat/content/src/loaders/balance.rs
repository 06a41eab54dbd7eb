//! Balance configuration loader.

use std::path::Path;

use combat_core::BalanceConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for `balance.toml`. Absent keys keep their reference values.
pub struct BalanceLoader;

impl BalanceLoader {
    pub fn load(path: &Path) -> LoadResult<BalanceConfig> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<BalanceConfig> {
        let config: BalanceConfig =
            toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse balance TOML: {}", e))?;
        Self::check(&config)?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    fn check(config: &BalanceConfig) -> LoadResult<()> {
        if config.scheduler_threshold == 0 {
            anyhow::bail!("scheduler_threshold must be positive");
        }
        if config.flee_min_chance > config.flee_max_chance {
            anyhow::bail!(
                "flee_min_chance ({}) exceeds flee_max_chance ({})",
                config.flee_min_chance,
                config.flee_max_chance
            );
        }
        let costs = config.tier_costs;
        if costs.light == 0 || costs.standard == 0 || costs.heavy == 0 {
            anyhow::bail!("speed tier costs must be positive");
        }
        Ok(())
    }
}
