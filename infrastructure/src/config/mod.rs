//! Configuration file loading for policy-agents
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `POLICY_AGENTS_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./policy-agents.toml` or `./.policy-agents.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/policy-agents/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileChunkingConfig, FileConfig, FileEvaluationConfig, FileExtractionConfig,
    FileOutputConfig, FileReasoningConfig, FileReportConfig, FileRetryConfig,
    FileRuleGraphConfig,
};
pub use loader::ConfigLoader;

use policy_domain::ConfigIssue;
use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failures. Any of these aborts before a run begins.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration:\n{}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error("No API key for the reasoning service: set the {env} environment variable")]
    MissingApiKey { env: String },

    #[error("Failed to build the reasoning client: {0}")]
    Client(String),

    #[error("Failed to load rule graph from {}: {reason}", path.display())]
    RuleGraph { path: PathBuf, reason: String },
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

impl FileConfig {
    /// Validate and fail on any error-severity issue. Warnings are returned.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigurationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigurationError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_splits_errors_from_warnings() {
        let mut config = FileConfig::default();
        config.extraction.domain_hint = Some("astrology".to_string());
        let warnings = config.check().unwrap();
        assert_eq!(warnings.len(), 1);

        config.chunking.max_tokens = 0;
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("chunking.max_tokens"));
    }
}
