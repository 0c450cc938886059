//! Score evaluator
//!
//! Weighted scoring models are computed by the reasoning service once every
//! factor the spec needs is present.

use super::{EvaluationFailure, Evaluator, ReasoningClient, from_verdict, missing_data_result};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, ArchetypeParams, EvaluatorKind, EvaluatorPromptTemplate, ExtractedData,
};

pub struct ScoreEvaluator {
    reasoning: ReasoningClient,
}

impl ScoreEvaluator {
    pub fn new(reasoning: ReasoningClient) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl Evaluator for ScoreEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Score
    }

    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        let ArchetypeParams::Score(params) = &spec.archetype_params else {
            return Err(EvaluationFailure::ArchetypeMismatch {
                evaluator: self.kind(),
                actual: spec.archetype,
            });
        };

        if let Some(result) = missing_data_result(spec, data, self.kind()) {
            return Ok(result);
        }

        let prompt =
            EvaluatorPromptTemplate::score_prompt(spec, params, &data.subset(&spec.data_fields));
        let verdict = self.reasoning.verdict(prompt).await?;
        Ok(from_verdict(spec, verdict, self.kind()))
    }
}
