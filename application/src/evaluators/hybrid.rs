//! Hybrid evaluator
//!
//! Owns the authoritative rule the rule graph returned for its agent at
//! creation time. Every verdict it produces has origin `rule_graph`.

use super::threshold::compare_single_field;
use super::{EvaluationFailure, Evaluator, ReasoningClient, from_verdict, missing_data_result};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, AuthoritativeRule, EvaluatorKind, EvaluatorPromptTemplate,
    ExtractedData, Origin,
};
use serde_json::json;

pub struct HybridEvaluator {
    reasoning: ReasoningClient,
    rule: AuthoritativeRule,
}

impl HybridEvaluator {
    pub fn new(reasoning: ReasoningClient, rule: AuthoritativeRule) -> Self {
        Self { reasoning, rule }
    }

    pub fn rule(&self) -> &AuthoritativeRule {
        &self.rule
    }

    async fn evaluate_inner(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        if let Some(result) = missing_data_result(spec, data, self.kind()) {
            return Ok(result);
        }

        // The rule's threshold wins over the one extracted from the policy text.
        if let Some(threshold) = &self.rule.threshold
            && let Some(result) = compare_single_field(spec, threshold, data, self.kind())
        {
            return Ok(result);
        }

        let subset = data.subset(&spec.data_fields);
        let prompt = EvaluatorPromptTemplate::hybrid_prompt(spec, &self.rule, &subset);
        let verdict = self.reasoning.verdict(prompt).await?;
        Ok(from_verdict(spec, verdict, self.kind()))
    }
}

#[async_trait]
impl Evaluator for HybridEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Hybrid
    }

    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        let mut result = self.evaluate_inner(spec, data).await?.with_origin(Origin::RuleGraph);
        if !result.details.is_object() {
            result.details = json!({});
        }
        result.details["rule_id"] = json!(self.rule.rule_id);
        Ok(result)
    }
}
