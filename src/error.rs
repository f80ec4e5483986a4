//! Fatal request errors.
//!
//! Validator and evaluator findings are never errors; they travel with a
//! successful response as [`crate::service::Warning`]s.

use thiserror::Error;

/// Errors that abort a dispatch request before any solving work begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Malformed series or constraint values.
    #[error("invalid input: {field}: {message}")]
    InvalidInput {
        /// Dotted field path (e.g., `"constraints.socMin"`).
        field: String,
        /// Human-readable constraint description.
        message: String,
    },

    /// The requested strategy name is not registered.
    #[error("unknown strategy \"{0}\", available: deterministic, annealing, sampling")]
    UnknownStrategy(String),
}

impl DispatchError {
    /// Shorthand for [`DispatchError::InvalidInput`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable error kind used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::UnknownStrategy(_) => "unknown_strategy",
        }
    }
}
