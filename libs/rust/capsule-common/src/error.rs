//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value was absent or empty
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// An environment variable could not be parsed into its target type
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },

    /// A value parsed but is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Create a missing required error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequired(field.into())
    }

    /// Create an invalid value error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
