//! Error types for JSON normalization and resource planning.

use thiserror::Error;

/// The input string is not syntactically valid JSON.
///
/// Plan modifiers recover from this locally by keeping the planned value;
/// surfacing the problem to the user is left to [`crate::validation`].
#[derive(Debug, Error)]
#[error("invalid JSON: {0}")]
pub struct ParseError(#[from] serde_json::Error);

impl ParseError {
    /// One-based line of the syntax error.
    pub fn line(&self) -> usize {
        self.0.line()
    }

    /// One-based column of the syntax error.
    pub fn column(&self) -> usize {
        self.0.column()
    }

    /// The underlying serde_json error.
    pub fn inner(&self) -> &serde_json::Error {
        &self.0
    }
}

/// Errors returned while planning a resource.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested resource type has no schema.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The plan request is structurally unusable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Raw state bytes could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Get the error message as a string.
    pub fn message(&self) -> &str {
        match self {
            Self::UnknownResource(msg) => msg,
            Self::InvalidRequest(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
        }
    }
}
