//! Threshold evaluator
//!
//! A single numeric field is compared deterministically; derived values
//! (ratios, sums over several fields) go to the reasoning service.

use super::{
    EvaluationFailure, Evaluator, ReasoningClient, from_verdict, missing_data_result, single_field,
};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, EvaluatorKind, EvaluatorPromptTemplate, ExtractedData, ThresholdParams,
};
use serde_json::json;
use tracing::debug;

pub struct ThresholdEvaluator {
    reasoning: ReasoningClient,
}

impl ThresholdEvaluator {
    pub fn new(reasoning: ReasoningClient) -> Self {
        Self { reasoning }
    }
}

/// Compare one numeric field against `params`, or `None` when the spec
/// needs more than one field or the value is not numeric.
pub(crate) fn compare_single_field(
    spec: &AgentSpec,
    params: &ThresholdParams,
    data: &ExtractedData,
    evaluator: EvaluatorKind,
) -> Option<AgentResult> {
    let field = single_field(spec)?;
    let entry = data.get(field)?;
    let value = entry.as_number()?;
    let threshold = params.describe();

    let passed = params.is_satisfied_by(value);
    let verb = if passed { "meets" } else { "does not meet" };
    let reason = format!("{} = {} {} threshold {}", field, value, verb, threshold);
    debug!("{}: {}", spec.agent_id, reason);

    Some(
        AgentResult::verdict(spec, Some(passed), entry.confidence, reason, evaluator).with_details(
            json!({
                "calculated_value": value,
                "threshold": threshold,
                "method": "deterministic",
            }),
        ),
    )
}

#[async_trait]
impl Evaluator for ThresholdEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Threshold
    }

    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        let params = spec.archetype_params.as_threshold().ok_or(
            EvaluationFailure::ArchetypeMismatch {
                evaluator: self.kind(),
                actual: spec.archetype,
            },
        )?;

        if let Some(result) = missing_data_result(spec, data, self.kind()) {
            return Ok(result);
        }

        if let Some(result) = compare_single_field(spec, params, data, self.kind()) {
            return Ok(result);
        }

        let subset = data.subset(&spec.data_fields);
        let prompt = EvaluatorPromptTemplate::threshold_prompt(spec, params, &subset);
        let verdict = self.reasoning.verdict(prompt).await?;
        Ok(from_verdict(spec, verdict, self.kind()))
    }
}
