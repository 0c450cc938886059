//! Qualitative evaluator

use super::{EvaluationFailure, Evaluator, ReasoningClient, from_verdict, missing_data_result};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, ArchetypeParams, EvaluatorKind, EvaluatorPromptTemplate, ExtractedData,
};
pub struct QualitativeEvaluator {
    reasoning: ReasoningClient,
}

impl QualitativeEvaluator {
    pub fn new(reasoning: ReasoningClient) -> Self {
        Self { reasoning }
    }
}

#[async_trait]
impl Evaluator for QualitativeEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Qualitative
    }

    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        let ArchetypeParams::Qualitative(params) = &spec.archetype_params else {
            return Err(EvaluationFailure::ArchetypeMismatch {
                evaluator: self.kind(),
                actual: spec.archetype,
            });
        };

        if let Some(result) = missing_data_result(spec, data, self.kind()) {
            return Ok(result);
        }

        let prompt = EvaluatorPromptTemplate::qualitative_prompt(
            spec,
            params,
            &data.subset(&spec.data_fields),
        );
        let verdict = self.reasoning.verdict(prompt).await?;
        Ok(from_verdict(spec, verdict, self.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ports::reasoning_service::ReasoningError;
    use policy_domain::QualitativeParams;
    use serde_json::json;
    use std::sync::Arc;

    fn spec() -> AgentSpec {
        AgentSpec::new(
            "Management Quality",
            "Management team should demonstrate relevant industry experience",
            ArchetypeParams::Qualitative(QualitativeParams {
                assessment_criteria: vec!["industry experience".into(), "track record".into()],
            }),
        )
        .with_data_fields(["management_bios"])
    }

    #[tokio::test]
    async fn test_judgment_verdict() {
        let service = Arc::new(ScriptedReasoning::new(vec![Ok(json!({
            "passed": true,
            "confidence": 0.7,
            "reason": "CEO has 15 years in the sector",
            "findings": ["strong track record"]
        }))]));
        let data = ExtractedData::new().with("management_bios", json!("CEO: 15 years in retail"));

        let result = QualitativeEvaluator::new(client(&service))
            .evaluate(&spec(), &data)
            .await
            .unwrap();

        assert_eq!(result.passed, Some(true));
        assert_eq!(result.details["findings"][0], "strong track record");
        assert!(service.prompt(0).contains("- industry experience"));
    }

    #[tokio::test]
    async fn test_reasoning_failure_propagates() {
        let service = Arc::new(ScriptedReasoning::new(vec![Err(ReasoningError::MalformedOutput(
            "truncated".into(),
        ))]));
        let data = ExtractedData::new().with("management_bios", json!("..."));
        let err = QualitativeEvaluator::new(client(&service))
            .evaluate(&spec(), &data)
            .await
            .unwrap_err();
        assert!(matches!(err, EvaluationFailure::Reasoning(_)));
    }

    #[tokio::test]
    async fn test_partial_evidence_is_inconclusive() {
        let service = Arc::new(ScriptedReasoning::new(vec![]));
        let spec = spec().with_data_fields(["management_bios", "succession_plan"]);
        let data = ExtractedData::new().with("management_bios", json!("CEO: 15 years in retail"));

        let result = QualitativeEvaluator::new(client(&service))
            .evaluate(&spec, &data)
            .await
            .unwrap();

        assert_eq!(result.passed, None);
        assert!(result.reason.contains("succession_plan"));
        assert!(!result.reason.contains("management_bios"));
        assert_eq!(service.calls(), 0);
    }
}
