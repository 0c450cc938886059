//! Rule graph port
//!
//! Authoritative requirement data keyed by domain and normalized
//! requirement text.

use async_trait::async_trait;
use policy_domain::{AuthoritativeRule, PolicyDomain};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RuleGraphError {
    #[error("Rule graph unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid rule data: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait RuleGraph: Send + Sync {
    /// Look up the rule for `requirement_key` within `domain`.
    ///
    /// `Ok(None)` means no matching rule.
    async fn lookup(
        &self,
        domain: PolicyDomain,
        requirement_key: &str,
    ) -> Result<Option<AuthoritativeRule>, RuleGraphError>;
}

/// Rule graph with no rules, used when none is configured
pub struct NoRuleGraph;

#[async_trait]
impl RuleGraph for NoRuleGraph {
    async fn lookup(
        &self,
        _domain: PolicyDomain,
        _requirement_key: &str,
    ) -> Result<Option<AuthoritativeRule>, RuleGraphError> {
        Ok(None)
    }
}
