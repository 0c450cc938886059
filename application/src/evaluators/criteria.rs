//! Criteria evaluator
//!
//! Yes/no conditions. A single boolean-like field is compared directly
//! with the expected value; anything else is left to the reasoning service.

use super::{
    EvaluationFailure, Evaluator, ReasoningClient, from_verdict, missing_data_result, single_field,
};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, ArchetypeParams, EvaluatorKind, EvaluatorPromptTemplate, ExtractedData,
};
use serde_json::{Value, json};

pub struct CriteriaEvaluator {
    reasoning: ReasoningClient,
}

impl CriteriaEvaluator {
    pub fn new(reasoning: ReasoningClient) -> Self {
        Self { reasoning }
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "present" | "compliant" | "met" => Some(true),
        "no" | "n" | "false" | "absent" | "non-compliant" | "not met" => Some(false),
        _ => None,
    }
}

fn value_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_flag(s),
        _ => None,
    }
}

#[async_trait]
impl Evaluator for CriteriaEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Criteria
    }

    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        let ArchetypeParams::Criteria(params) = &spec.archetype_params else {
            return Err(EvaluationFailure::ArchetypeMismatch {
                evaluator: self.kind(),
                actual: spec.archetype,
            });
        };

        if let Some(result) = missing_data_result(spec, data, self.kind()) {
            return Ok(result);
        }

        if let Some(field) = single_field(spec)
            && let Some(entry) = data.get(field)
            && let Some(actual) = value_flag(&entry.value)
            && let Some(expected) = parse_flag(&params.expected_value)
        {
            let passed = actual == expected;
            let reason = format!(
                "{} is {}, expected {}",
                field,
                if actual { "yes" } else { "no" },
                params.expected_value
            );
            return Ok(
                AgentResult::verdict(spec, Some(passed), entry.confidence, reason, self.kind())
                    .with_details(json!({ "method": "deterministic" })),
            );
        }

        let prompt =
            EvaluatorPromptTemplate::criteria_prompt(spec, params, &data.subset(&spec.data_fields));
        let verdict = self.reasoning.verdict(prompt).await?;
        Ok(from_verdict(spec, verdict, self.kind()))
    }
}
