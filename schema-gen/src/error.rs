//! Error types for the schema compiler core.
//!
//! Classification is total and never fails; these errors cover contract
//! violations at generation time, where silent degradation would ship wrong
//! code to every downstream consumer.

use thiserror::Error;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Error raised by generator-contract methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratorError {
    /// A variant was requested that the schema does not declare.
    ///
    /// An earlier revision silently fell back to the full field list here,
    /// which shipped unintended full-field types under narrower names.
    #[error("schema '{schema}' has no variant named '{variant}'")]
    UnknownVariant {
        /// The schema on which the variant was requested.
        schema: String,
        /// The unknown variant name.
        variant: String,
    },

    /// The schema carries error-level validation issues and cannot be rendered.
    #[error("schema '{schema}' failed validation: {details}")]
    InvalidSchema {
        /// The schema that failed validation.
        schema: String,
        /// Semicolon-joined error messages.
        details: String,
    },

    /// A backend could not render a schema for a target-specific reason.
    #[error("error rendering schema '{schema}': {message}")]
    Render {
        /// The schema being rendered.
        schema: String,
        /// Backend-specific failure message.
        message: String,
    },
}

impl GeneratorError {
    /// Create an unknown-variant error.
    pub fn unknown_variant(schema: impl Into<String>, variant: impl Into<String>) -> Self {
        GeneratorError::UnknownVariant {
            schema: schema.into(),
            variant: variant.into(),
        }
    }

    /// Create a render error for the given schema.
    pub fn render(schema: impl Into<String>, message: impl Into<String>) -> Self {
        GeneratorError::Render {
            schema: schema.into(),
            message: message.into(),
        }
    }
}
