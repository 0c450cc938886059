//! Domain error types

use thiserror::Error;

/// Errors raised while partitioning a document into chunks.
///
/// Chunking failures are fatal: the pipeline aborts before any
/// reasoning calls are spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("Document is empty after normalization")]
    EmptyInput,

    #[error("Token budget must be greater than zero")]
    ZeroBudget,
}

/// Errors raised when a raw candidate cannot become an [`AgentSpec`].
///
/// The offending candidate is dropped; the rest of the batch continues.
///
/// [`AgentSpec`]: crate::agent::spec::AgentSpec
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidField { field, .. } => field,
        }
    }
}
