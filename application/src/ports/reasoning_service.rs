//! Reasoning service port
//!
//! Defines the interface for structured completions from an LLM backend.

use async_trait::async_trait;
use policy_domain::OutputSchema;
use serde_json::Value;
use thiserror::Error;

/// Typed failures of a reasoning call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReasoningError {
    #[error("Reasoning call timed out")]
    Timeout,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ReasoningError {
    /// Whether a retry may succeed.
    ///
    /// `Timeout` and `MalformedOutput` are never retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReasoningError::RateLimited(_) | ReasoningError::ServiceUnavailable(_)
        )
    }
}

/// One structured completion request
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    pub system: String,
    pub prompt: String,
    pub schema: OutputSchema,
}

impl ReasoningRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, schema: OutputSchema) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            schema,
        }
    }
}

/// Structured completion backend
///
/// Implementations (adapters) live in the infrastructure layer. They are
/// shared across concurrent tasks without locks.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Complete `request` and return the parsed JSON value.
    async fn complete(&self, request: &ReasoningRequest) -> Result<Value, ReasoningError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(ReasoningError::RateLimited("429".into()).is_transient());
        assert!(ReasoningError::ServiceUnavailable("503".into()).is_transient());
        assert!(!ReasoningError::Timeout.is_transient());
        assert!(!ReasoningError::MalformedOutput("not json".into()).is_transient());
    }
}
