//! Common error infrastructure for combat-core.
//!
//! Domain-specific errors (e.g. [`ActionRejected`](crate::ActionRejected),
//! [`ConditionParseError`](crate::ConditionParseError)) live beside the code
//! that produces them. This module provides the shared classification used by
//! the runtime to decide how to surface each failure.
//!
//! # Design Principles
//!
//! - **Never fatal on authored data**: parse errors are turned into diagnostics
//!   and a safe default before combat ever sees them
//! - **No mutation on rejection**: validation errors are raised before any
//!   combatant is touched
//! - **Severity Classification**: errors are categorized for recovery strategies

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - retry with another input.
    ///
    /// Examples: illegal player action, technique unusable in current stance
    Recoverable,

    /// Validation error - invalid configuration, should not retry without changes.
    ///
    /// Examples: malformed condition string, encounter without enemies
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// These indicate engine bugs and should be investigated.
    Internal,

    /// Fatal error - simulation cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait CombatError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for metrics and assertions in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
