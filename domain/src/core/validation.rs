//! Configuration issues detected before a run starts.
//!
//! Loaders collect every issue instead of stopping at the first one, so the
//! CLI can print them all. Any [`Severity::Error`] aborts the run.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the pipeline cannot run with this configuration.
    Error,
    /// Non-fatal: the pipeline runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `chunking.max_tokens` is zero.
    ZeroChunkBudget,
    /// An extraction or evaluation concurrency setting is zero.
    ZeroConcurrency,
    /// A per-call or per-agent timeout is zero.
    ZeroTimeout,
    /// A domain name (`extraction.domain_hint`, `evaluation.hybrid_domains`)
    /// is not a known policy domain.
    UnknownDomain,
    /// `evaluation.archetype_evaluators` names an unknown archetype.
    UnknownArchetype,
    /// `retry.max_attempts` is zero.
    ZeroAttempts,
    /// The rule graph file is configured but does not exist.
    RuleGraphNotFound,
    /// Per-agent timeout is shorter than a single reasoning call.
    AgentTimeoutBelowCallTimeout,
}

/// A detected configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_constructors() {
        let err = ConfigIssue::error(ConfigIssueCode::ZeroConcurrency, "max_concurrency is 0");
        assert!(err.is_error());
        assert_eq!(err.to_string(), "error: max_concurrency is 0");

        let warn = ConfigIssue::warning(ConfigIssueCode::UnknownDomain, "unknown domain");
        assert!(!warn.is_error());
        assert_eq!(warn.code, ConfigIssueCode::UnknownDomain);
    }
}
