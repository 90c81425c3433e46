use crate::expression::error::ParsingError;

/// Convenience result type used across mbstyle.
pub type StyleResult<T> = Result<T, StyleError>;

/// Top-level error taxonomy used by the style APIs.
#[derive(thiserror::Error, Debug)]
pub enum StyleError {
    /// One or more static errors found while parsing/type-checking an expression.
    #[error("parse error: {}", join_parse_errors(.0))]
    Parse(Vec<ParsingError>),

    /// Errors raised while evaluating an expression with error recovery disabled.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Invalid user-provided style data (property specs, legacy functions, layers).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StyleError {
    /// Build a [`StyleError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StyleError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`StyleError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Parse errors carried by this error, if any.
    pub fn parse_errors(&self) -> &[ParsingError] {
        match self {
            Self::Parse(errors) => errors,
            _ => &[],
        }
    }
}

impl From<Vec<ParsingError>> for StyleError {
    fn from(errors: Vec<ParsingError>) -> Self {
        Self::Parse(errors)
    }
}

impl From<serde_json::Error> for StyleError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

fn join_parse_errors(errors: &[ParsingError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
