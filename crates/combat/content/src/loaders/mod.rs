//! Content loaders for reading combat data from files.

pub mod balance;
pub mod factory;
pub mod patterns;
pub mod techniques;

pub use balance::BalanceLoader;
pub use factory::{ContentBundle, ContentFactory};
pub use patterns::AiPatternLoader;
pub use techniques::TechniqueLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
