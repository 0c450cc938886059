//! JSON-file backed [`RuleGraph`].
//!
//! ```json
//! {
//!   "rules": [
//!     {
//!       "domain": "financial",
//!       "requirement_keys": ["credit score must be at least 620"],
//!       "keywords": ["fico", "credit score"],
//!       "rule": { "rule_id": "CR-001", "name": "Minimum FICO", "threshold": { ... } }
//!     }
//!   ]
//! }
//! ```
//!
//! An exact requirement key match wins. Otherwise the first entry in file
//! order whose keyword appears in the requirement key matches.

use crate::config::ConfigurationError;
use async_trait::async_trait;
use policy_application::{RuleGraph, RuleGraphError};
use policy_domain::{AuthoritativeRule, PolicyDomain};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    domain: PolicyDomain,
    #[serde(default)]
    requirement_keys: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    rule: AuthoritativeRule,
}

/// Same normalization as `AgentSpec::requirement_key`.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// In-memory rule graph loaded once at startup.
#[derive(Debug)]
pub struct FileRuleGraph {
    entries: Vec<RuleEntry>,
    exact: HashMap<(PolicyDomain, String), usize>,
}

impl FileRuleGraph {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigurationError::RuleGraph {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        let graph = Self::from_json(&content).map_err(|e| ConfigurationError::RuleGraph {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!("Loaded {} rules from {}", graph.len(), path.display());
        Ok(graph)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: RuleFile = serde_json::from_str(content)?;
        let mut entries = file.rules;
        for entry in &mut entries {
            entry.keywords = entry
                .keywords
                .iter()
                .map(|k| normalize(k))
                .filter(|k| !k.is_empty())
                .collect();
        }

        let mut exact = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            for key in &entry.requirement_keys {
                // First entry wins on duplicate keys
                exact.entry((entry.domain, normalize(key))).or_insert(i);
            }
        }

        Ok(Self { entries, exact })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, domain: PolicyDomain, requirement_key: &str) -> Option<&RuleEntry> {
        let key = normalize(requirement_key);
        if let Some(&i) = self.exact.get(&(domain, key.clone())) {
            return Some(&self.entries[i]);
        }
        self.entries
            .iter()
            .filter(|e| e.domain == domain)
            .find(|e| e.keywords.iter().any(|k| key.contains(k.as_str())))
    }
}

#[async_trait]
impl RuleGraph for FileRuleGraph {
    async fn lookup(
        &self,
        domain: PolicyDomain,
        requirement_key: &str,
    ) -> Result<Option<AuthoritativeRule>, RuleGraphError> {
        let found = self.find(domain, requirement_key).map(|e| e.rule.clone());
        debug!(
            "Rule graph lookup ({}, {:?}): {}",
            domain,
            requirement_key,
            found.as_ref().map(|r| r.rule_id.as_str()).unwrap_or("not found")
        );
        Ok(found)
    }
}
