//! Construction errors.
//!
//! Every error here is a programmer or configuration mistake surfaced while a
//! component is being built. Repeated `init`/`destroy` calls and duplicate
//! registration are defined as no-ops and never produce an error.

use thiserror::Error;

/// Errors raised while constructing a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// The options input named a preset the class does not declare.
    #[error("invalid preset: {preset}")]
    UnknownPreset { preset: String },

    /// An embedded `$preset` field held something other than a string.
    #[error("the `$preset` option field must be a string")]
    InvalidPresetField,

    /// The parent class declares no role for the child's class.
    #[error("{parent} has no child: {child}")]
    NoSuchChildRole {
        parent: &'static str,
        child: &'static str,
    },

    /// The parent class maps more than one role to the child's class.
    #[error("{parent} declares {child} under multiple roles: {}", roles.join(", "))]
    AmbiguousChildRole {
        parent: &'static str,
        child: &'static str,
        roles: Vec<String>,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ComponentError>;
