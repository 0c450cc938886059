//! Pipeline sections from TOML (`[chunking]`, `[extraction]`, `[evaluation]`, `[retry]`)

use policy_domain::{
    Archetype, ConfigIssue, ConfigIssueCode, DEFAULT_MAX_TOKENS, PolicyDomain,
};
use serde::{Deserialize, Serialize};

/// `[chunking]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChunkingConfig {
    /// Approximate token budget per chunk
    pub max_tokens: usize,
}

impl Default for FileChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// `[extraction]`
///
/// # Example
///
/// ```toml
/// [extraction]
/// concurrency = 8
/// domain_hint = "financial"
/// call_timeout_secs = 90
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExtractionConfig {
    /// Concurrent requirement-extraction calls
    pub concurrency: usize,
    /// Expected policy domain, passed to extraction prompts
    pub domain_hint: Option<String>,
    /// Timeout for one extraction call; `0` disables it
    pub call_timeout_secs: u64,
}

impl Default for FileExtractionConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            domain_hint: None,
            call_timeout_secs: 60,
        }
    }
}

impl FileExtractionConfig {
    /// Parse `domain_hint`, returning a warning for unknown domains.
    pub fn parse_domain_hint(&self) -> (Option<PolicyDomain>, Vec<ConfigIssue>) {
        let Some(raw) = self.domain_hint.as_deref() else {
            return (None, vec![]);
        };
        match raw.parse::<PolicyDomain>() {
            Ok(domain) => (Some(domain), vec![]),
            Err(_) => (
                None,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownDomain,
                    format!("extraction.domain_hint: unknown domain '{}', ignoring", raw),
                )],
            ),
        }
    }
}

/// `[evaluation]`
///
/// # Example
///
/// ```toml
/// [evaluation]
/// concurrency_limit = 8
/// task_timeout_secs = 180
/// archetype_evaluators = ["threshold", "criteria"]
/// hybrid_domains = ["financial"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEvaluationConfig {
    /// Concurrent agent evaluations; unset uses available parallelism × 2
    pub concurrency_limit: Option<usize>,
    /// Timeout for one agent evaluation
    pub task_timeout_secs: u64,
    /// Archetypes with a dedicated evaluator; the rest fall back to universal
    pub archetype_evaluators: Vec<String>,
    /// Domains whose agents consult the rule graph first
    pub hybrid_domains: Vec<String>,
}

impl Default for FileEvaluationConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: None,
            task_timeout_secs: 120,
            archetype_evaluators: Archetype::ALL.iter().map(|a| a.to_string()).collect(),
            hybrid_domains: vec![],
        }
    }
}

impl FileEvaluationConfig {
    /// Parse `archetype_evaluators`, skipping unknown names with a warning.
    pub fn parse_archetypes(&self) -> (Vec<Archetype>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let archetypes = self
            .archetype_evaluators
            .iter()
            .filter_map(|raw| match raw.parse::<Archetype>() {
                Ok(a) => Some(a),
                Err(_) => {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnknownArchetype,
                        format!("evaluation.archetype_evaluators: unknown archetype '{}'", raw),
                    ));
                    None
                }
            })
            .collect();
        (archetypes, issues)
    }

    /// Parse `hybrid_domains`, skipping unknown names with a warning.
    pub fn parse_hybrid_domains(&self) -> (Vec<PolicyDomain>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let domains = self
            .hybrid_domains
            .iter()
            .filter_map(|raw| match raw.parse::<PolicyDomain>() {
                Ok(d) => Some(d),
                Err(_) => {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnknownDomain,
                        format!("evaluation.hybrid_domains: unknown domain '{}'", raw),
                    ));
                    None
                }
            })
            .collect();
        (domains, issues)
    }
}

/// `[retry]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    /// Attempts per reasoning call, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubled on each further attempt
    pub base_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
        }
    }
}
