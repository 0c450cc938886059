//! Authoritative rules served by the rule graph.

use crate::agent::spec::ThresholdParams;
use serde::{Deserialize, Serialize};

/// A requirement linked to a rule ("requires", "overrides", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRule {
    pub rule_id: String,
    pub name: String,
    pub link_type: String,
    #[serde(default)]
    pub strength: Option<String>,
}

/// Structured rule returned by a rule-graph lookup.
///
/// Owned by the hybrid evaluator built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoritativeRule {
    pub rule_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Numeric limit, when the rule is a threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdParams>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked: Vec<LinkedRule>,
}

impl AuthoritativeRule {
    /// Plain-text rendering for prompts.
    pub fn context(&self) -> String {
        let mut parts = vec![format!("Requirement {}: {}", self.rule_id, self.name)];
        if !self.description.is_empty() {
            parts.push(format!("Description: {}", self.description));
        }
        if let Some(threshold) = &self.threshold {
            parts.push(format!("Threshold: {}", threshold.describe()));
        }
        if !self.conditions.is_empty() {
            parts.push(format!("Conditions: {}", self.conditions.join("; ")));
        }
        if !self.linked.is_empty() {
            parts.push("Linked Requirements:".to_string());
            for link in &self.linked {
                let strength = link
                    .strength
                    .as_deref()
                    .map(|s| format!(", {}", s))
                    .unwrap_or_default();
                parts.push(format!(
                    "  -> {} {} ({}{})",
                    link.rule_id, link.name, link.link_type, strength
                ));
            }
        }
        parts.join("\n")
    }
}
