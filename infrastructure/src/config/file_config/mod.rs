//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the application's
//! [`PipelineConfig`] once validated.

mod output;
mod pipeline;
mod reasoning;

pub use output::{FileOutputConfig, FileReportConfig};
pub use pipeline::{
    FileChunkingConfig, FileEvaluationConfig, FileExtractionConfig, FileRetryConfig,
};
pub use reasoning::{FileReasoningConfig, FileRuleGraphConfig};

use policy_application::{PipelineConfig, RetryPolicy};
use policy_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub chunking: FileChunkingConfig,
    pub extraction: FileExtractionConfig,
    pub evaluation: FileEvaluationConfig,
    pub retry: FileRetryConfig,
    pub report: FileReportConfig,
    /// Reasoning backend (OpenAI-compatible HTTP)
    pub reasoning: FileReasoningConfig,
    pub rule_graph: FileRuleGraphConfig,
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Zero budgets, concurrency limits, timeouts and attempts
    /// 2. Unknown domain and archetype names
    /// 3. A configured rule graph file that does not exist
    /// 4. A per-agent timeout shorter than one reasoning request
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Zero values
        if self.chunking.max_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroChunkBudget,
                "chunking.max_tokens must be greater than 0",
            ));
        }
        if self.extraction.concurrency == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroConcurrency,
                "extraction.concurrency must be greater than 0",
            ));
        }
        if self.evaluation.concurrency_limit == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroConcurrency,
                "evaluation.concurrency_limit must be greater than 0",
            ));
        }
        if self.evaluation.task_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "evaluation.task_timeout_secs must be greater than 0",
            ));
        }
        if self.reasoning.request_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "reasoning.request_timeout_secs must be greater than 0",
            ));
        }
        if self.retry.max_attempts == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroAttempts,
                "retry.max_attempts is 0, using a single attempt",
            ));
        }

        // 2. Names
        issues.extend(self.extraction.parse_domain_hint().1);
        issues.extend(self.evaluation.parse_archetypes().1);
        issues.extend(self.evaluation.parse_hybrid_domains().1);

        // 3. Rule graph file
        if let Some(path) = &self.rule_graph.path
            && !path.exists()
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::RuleGraphNotFound,
                format!("rule_graph.path: {} does not exist", path.display()),
            ));
        }

        // 4. Timeout ordering
        if self.evaluation.task_timeout_secs > 0
            && self.evaluation.task_timeout_secs < self.reasoning.request_timeout_secs
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::AgentTimeoutBelowCallTimeout,
                format!(
                    "evaluation.task_timeout_secs ({}) is shorter than reasoning.request_timeout_secs ({})",
                    self.evaluation.task_timeout_secs, self.reasoning.request_timeout_secs
                ),
            ));
        }

        issues
    }

    /// Build the application pipeline parameters.
    ///
    /// Invalid names are skipped and zero values fall back to the nearest
    /// usable value; [`validate`](Self::validate) reports both.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let call_timeout = match self.extraction.call_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        PipelineConfig::default()
            .with_max_tokens(if self.chunking.max_tokens == 0 {
                defaults.max_tokens
            } else {
                self.chunking.max_tokens
            })
            .with_extraction_concurrency(self.extraction.concurrency)
            .with_domain_hint(self.extraction.parse_domain_hint().0)
            .with_concurrency_limit(
                self.evaluation
                    .concurrency_limit
                    .unwrap_or(defaults.concurrency_limit),
            )
            .with_task_timeout(if self.evaluation.task_timeout_secs == 0 {
                defaults.task_timeout
            } else {
                Duration::from_secs(self.evaluation.task_timeout_secs)
            })
            .with_call_timeout(call_timeout)
            .with_retry(RetryPolicy::new(
                self.retry.max_attempts,
                Duration::from_millis(self.retry.base_delay_ms),
            ))
            .with_max_recommendations(self.report.max_recommendations)
            .with_archetype_evaluators(self.evaluation.parse_archetypes().0)
            .with_hybrid_domains(self.evaluation.parse_hybrid_domains().0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_domain::{Archetype, OutputFormat, PolicyDomain};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[chunking]
max_tokens = 600

[extraction]
concurrency = 2
domain_hint = "financial"

[evaluation]
concurrency_limit = 3
task_timeout_secs = 90
archetype_evaluators = ["threshold", "criteria"]
hybrid_domains = ["financial"]

[retry]
max_attempts = 5
base_delay_ms = 100

[report]
max_recommendations = 4

[reasoning]
base_url = "http://localhost:11434/v1"
model = "llama3.1"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chunking.max_tokens, 600);
        assert_eq!(config.extraction.domain_hint.as_deref(), Some("financial"));
        assert_eq!(config.evaluation.concurrency_limit, Some(3));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.report.max_recommendations, 4);
        assert_eq!(config.reasoning.model, "llama3.1");
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);

        let pipeline = config.to_pipeline_config();
        assert_eq!(pipeline.max_tokens, 600);
        assert_eq!(pipeline.extraction_concurrency, 2);
        assert_eq!(pipeline.domain_hint, Some(PolicyDomain::Financial));
        assert_eq!(pipeline.concurrency_limit, 3);
        assert_eq!(pipeline.task_timeout, Duration::from_secs(90));
        assert_eq!(pipeline.retry.max_attempts, 5);
        assert_eq!(pipeline.retry.base_delay, Duration::from_millis(100));
        assert_eq!(pipeline.max_recommendations, 4);
        assert_eq!(pipeline.archetype_evaluators.len(), 2);
        assert!(pipeline.archetype_evaluators.contains(&Archetype::Criteria));
        assert!(pipeline.hybrid_domains.contains(&PolicyDomain::Financial));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[evaluation]
task_timeout_secs = 300
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.evaluation.task_timeout_secs, 300);
        // Defaults should apply
        assert_eq!(config.chunking.max_tokens, 400);
        assert_eq!(config.evaluation.archetype_evaluators.len(), 4);
        assert!(config.rule_graph.path.is_none());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_collects_all_issues() {
        let mut config = FileConfig::default();
        config.chunking.max_tokens = 0;
        config.evaluation.concurrency_limit = Some(0);
        config.evaluation.hybrid_domains = vec!["astrology".to_string()];
        config.rule_graph.path = Some("/nonexistent/rules.json".into());

        let issues = config.validate();
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::ZeroChunkBudget));
        assert!(codes.contains(&ConfigIssueCode::ZeroConcurrency));
        assert!(codes.contains(&ConfigIssueCode::UnknownDomain));
        assert!(codes.contains(&ConfigIssueCode::RuleGraphNotFound));
        assert_eq!(issues.iter().filter(|i| i.is_error()).count(), 3);
    }

    #[test]
    fn test_short_task_timeout_warns() {
        let mut config = FileConfig::default();
        config.evaluation.task_timeout_secs = 10;
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::AgentTimeoutBelowCallTimeout);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_zero_values_fall_back() {
        let mut config = FileConfig::default();
        config.chunking.max_tokens = 0;
        config.extraction.call_timeout_secs = 0;
        config.retry.max_attempts = 0;

        let pipeline = config.to_pipeline_config();
        assert_eq!(pipeline.max_tokens, 400);
        assert!(pipeline.call_timeout.is_none());
        assert_eq!(pipeline.retry.max_attempts, 1);
    }
}
