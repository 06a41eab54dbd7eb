//! Authored combat content and its loaders.
//!
//! This crate turns designer-facing data files into the immutable inputs of
//! `combat-core`:
//! - Technique catalog (`techniques.ron`)
//! - AI rule patterns (`ai_patterns.ron`)
//! - Balance configuration (`balance.toml`)
//!
//! A reference data set is embedded in the crate (see
//! [`ContentBundle::embedded`]) so tools and tests run without a data
//! directory.

pub mod spec;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use spec::{BonusSpec, TechniqueSpec};

#[cfg(feature = "loaders")]
pub use loaders::{AiPatternLoader, BalanceLoader, ContentBundle, ContentFactory, LoadResult, TechniqueLoader};
