//! Agent results (tri-state verdicts).

use super::spec::AgentSpec;
use super::value_objects::{EvaluatorKind, Origin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict of one agent for one run.
///
/// `passed` is tri-state: `Some(true)` pass, `Some(false)` fail, `None`
/// inconclusive. Inconclusive is a first-class outcome (missing data,
/// timeout, malformed reasoning output), not an error.
///
/// Produced exactly once per dispatched agent and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_id: String,
    /// Snapshot of the spec that was evaluated
    pub agent_config: AgentSpec,
    pub passed: Option<bool>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub reason: String,
    pub origin: Origin,
    pub evaluator: EvaluatorKind,
    pub evaluated_at: DateTime<Utc>,
    /// Evaluator-specific extras (calculated value, missing fields, findings)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl AgentResult {
    fn new(
        spec: &AgentSpec,
        passed: Option<bool>,
        confidence: f64,
        reason: impl Into<String>,
        evaluator: EvaluatorKind,
    ) -> Self {
        Self {
            agent_id: spec.agent_id.clone(),
            agent_config: spec.clone(),
            passed,
            confidence: sanitize_confidence(confidence),
            reason: reason.into(),
            origin: Origin::ReasoningOnly,
            evaluator,
            evaluated_at: Utc::now(),
            details: serde_json::Value::Null,
        }
    }

    pub fn pass(
        spec: &AgentSpec,
        confidence: f64,
        reason: impl Into<String>,
        evaluator: EvaluatorKind,
    ) -> Self {
        Self::new(spec, Some(true), confidence, reason, evaluator)
    }

    pub fn fail(
        spec: &AgentSpec,
        confidence: f64,
        reason: impl Into<String>,
        evaluator: EvaluatorKind,
    ) -> Self {
        Self::new(spec, Some(false), confidence, reason, evaluator)
    }

    /// Build a verdict from a tri-state value.
    pub fn verdict(
        spec: &AgentSpec,
        passed: Option<bool>,
        confidence: f64,
        reason: impl Into<String>,
        evaluator: EvaluatorKind,
    ) -> Self {
        Self::new(spec, passed, confidence, reason, evaluator)
    }

    /// Inconclusive result with zero confidence.
    pub fn inconclusive(
        spec: &AgentSpec,
        reason: impl Into<String>,
        evaluator: EvaluatorKind,
    ) -> Self {
        Self::new(spec, None, 0.0, reason, evaluator)
    }

    /// Mark the verdict as backed by authoritative rule-graph data.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn is_pass(&self) -> bool {
        self.passed == Some(true)
    }

    pub fn is_fail(&self) -> bool {
        self.passed == Some(false)
    }

    pub fn is_inconclusive(&self) -> bool {
        self.passed.is_none()
    }
}

/// Clamp to [0, 1]; NaN becomes 0.
fn sanitize_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
