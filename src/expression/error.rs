use std::fmt;

/// A static error found while parsing or type-checking an expression.
///
/// `key` is the argument path from the root, rendered as `[2][1]`; it is empty for errors
/// on the root node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingError {
    /// Argument path of the offending node.
    pub key: String,
    /// Human-readable description.
    pub message: String,
}

impl ParsingError {
    /// Build an error at `key`.
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.key, self.message)
        }
    }
}

impl std::error::Error for ParsingError {}

/// An error raised while evaluating a parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    /// Human-readable description.
    pub message: String,
}

impl RuntimeError {
    /// Build a runtime error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
#[path = "../../tests/unit/expression/error.rs"]
mod tests;
