//! Pipeline parameters: use case control.
//!
//! [`PipelineConfig`] groups the static parameters of a pipeline run:
//! chunk budget, concurrency limits, timeouts, retry policy, and the
//! evaluator registry. These are application-layer concerns, not domain
//! policy; the infrastructure config loader builds one from files.

use super::retry::RetryPolicy;
use policy_domain::{Archetype, DEFAULT_MAX_RECOMMENDATIONS, DEFAULT_MAX_TOKENS, PolicyDomain};
use std::collections::BTreeSet;
use std::time::Duration;

/// Upper clamp for the default evaluation concurrency.
const MAX_DEFAULT_CONCURRENCY: usize = 16;

/// Default evaluation concurrency: available parallelism × 2, clamped to 1..=16.
pub fn default_concurrency_limit() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
        .clamp(1, MAX_DEFAULT_CONCURRENCY)
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Token budget per chunk
    pub max_tokens: usize,
    /// Concurrent requirement-extraction calls
    pub extraction_concurrency: usize,
    /// Domain hint passed to extraction prompts
    pub domain_hint: Option<PolicyDomain>,
    /// Concurrent agent evaluations
    pub concurrency_limit: usize,
    /// Timeout for one agent evaluation
    pub task_timeout: Duration,
    /// Timeout for one reasoning call made by the extractor
    pub call_timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub max_recommendations: usize,
    /// Archetypes with a dedicated evaluator registered
    pub archetype_evaluators: BTreeSet<Archetype>,
    /// Domains with a hybrid evaluator registered
    pub hybrid_domains: BTreeSet<PolicyDomain>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            extraction_concurrency: 4,
            domain_hint: None,
            concurrency_limit: default_concurrency_limit(),
            task_timeout: Duration::from_secs(120),
            call_timeout: Some(Duration::from_secs(60)),
            retry: RetryPolicy::default(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            archetype_evaluators: Archetype::ALL.into_iter().collect(),
            hybrid_domains: BTreeSet::new(),
        }
    }
}

impl PipelineConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_extraction_concurrency(mut self, n: usize) -> Self {
        self.extraction_concurrency = n.max(1);
        self
    }

    pub fn with_domain_hint(mut self, hint: Option<PolicyDomain>) -> Self {
        self.domain_hint = hint;
        self
    }

    pub fn with_concurrency_limit(mut self, n: usize) -> Self {
        self.concurrency_limit = n.max(1);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    pub fn with_archetype_evaluators(
        mut self,
        archetypes: impl IntoIterator<Item = Archetype>,
    ) -> Self {
        self.archetype_evaluators = archetypes.into_iter().collect();
        self
    }

    pub fn with_hybrid_domains(mut self, domains: impl IntoIterator<Item = PolicyDomain>) -> Self {
        self.hybrid_domains = domains.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_concurrency_is_bounded() {
        let n = default_concurrency_limit();
        assert!((1..=MAX_DEFAULT_CONCURRENCY).contains(&n));
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_tokens, 400);
        assert_eq!(config.max_recommendations, 10);
        assert_eq!(config.archetype_evaluators.len(), 4);
        assert!(config.hybrid_domains.is_empty());
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_builder_clamps_concurrency() {
        let config = PipelineConfig::default()
            .with_concurrency_limit(0)
            .with_extraction_concurrency(0);
        assert_eq!(config.concurrency_limit, 1);
        assert_eq!(config.extraction_concurrency, 1);
    }
}
