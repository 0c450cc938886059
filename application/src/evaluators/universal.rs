//! Universal evaluator
//!
//! Last-resort evaluator for agents without a registered archetype
//! evaluator. The reasoning mode follows the spec's complexity:
//!
//! | Complexity   | Mode                                       |
//! |--------------|--------------------------------------------|
//! | simple       | one verdict call                           |
//! | quantitative | one verdict call asking for calculations   |
//! | comparative  | one verdict call against a benchmark       |
//! | multi_step   | plan steps, one call per step, synthesis   |
//!
//! When required fields are missing it asks whether the check applies at
//! all; the result is inconclusive either way.

use super::{EvaluationFailure, Evaluator, ReasoningClient, from_verdict};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, Complexity, EvaluatorKind, EvaluatorPromptTemplate, ExtractedData,
    OutputSchema,
};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Steps used when planning fails or returns nothing usable.
const FALLBACK_STEPS: [&str; 3] = ["Analyze data", "Check compliance", "Provide recommendation"];

const MAX_STEPS: usize = 7;

pub struct UniversalEvaluator {
    reasoning: ReasoningClient,
}

impl UniversalEvaluator {
    pub fn new(reasoning: ReasoningClient) -> Self {
        Self { reasoning }
    }

    async fn missing_data(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
        missing: Vec<String>,
    ) -> AgentResult {
        let prompt = EvaluatorPromptTemplate::applicability_prompt(
            spec,
            &missing,
            &data.subset(data.iter().map(|(k, _)| k)),
        );
        let applicability = match self
            .reasoning
            .complete(prompt, OutputSchema::applicability())
            .await
        {
            Ok(value) => parse_applicability(&value),
            Err(e) => {
                warn!("Applicability check failed for {}: {}", spec.agent_id, e);
                None
            }
        };

        let mut details = json!({ "missing_fields": missing });
        let reason = match applicability {
            Some((false, why)) => {
                details["applicable"] = json!(false);
                format!("Not applicable: {}", why)
            }
            Some((true, why)) => {
                details["applicable"] = json!(true);
                details["applicability_reason"] = json!(why);
                format!("Missing required data: {}", missing.join(", "))
            }
            None => format!("Missing required data: {}", missing.join(", ")),
        };
        AgentResult::inconclusive(spec, reason, self.kind()).with_details(details)
    }

    async fn multi_step(
        &self,
        spec: &AgentSpec,
        data: &Value,
    ) -> Result<AgentResult, EvaluationFailure> {
        let planned = match self
            .reasoning
            .complete(
                EvaluatorPromptTemplate::plan_steps_prompt(spec),
                OutputSchema::analysis_steps(),
            )
            .await
        {
            Ok(value) => parse_steps(&value),
            Err(e) => {
                warn!("Step planning failed for {}: {}", spec.agent_id, e);
                Vec::new()
            }
        };
        let steps = if planned.is_empty() {
            FALLBACK_STEPS.iter().map(|s| s.to_string()).collect()
        } else {
            planned
        };
        debug!("{}: {} analysis steps", spec.agent_id, steps.len());

        let mut step_results: Vec<Value> = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let prompt =
                EvaluatorPromptTemplate::step_prompt(spec, i + 1, step, data, &step_results);
            let output = self.reasoning.complete(prompt, OutputSchema::verdict()).await?;
            step_results.push(json!({
                "step": i + 1,
                "description": step,
                "result": output,
            }));
        }

        let verdict = self
            .reasoning
            .verdict(EvaluatorPromptTemplate::synthesis_prompt(spec, &step_results))
            .await?;
        let mut result = from_verdict(spec, verdict, self.kind());
        if !result.details.is_object() {
            result.details = json!({});
        }
        result.details["steps"] = Value::Array(step_results);
        Ok(result)
    }
}

fn parse_steps(value: &Value) -> Vec<String> {
    value
        .get("steps")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .take(MAX_STEPS)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_applicability(value: &Value) -> Option<(bool, String)> {
    let applicable = value.get("applicable")?.as_bool()?;
    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((applicable, reason))
}

#[async_trait]
impl Evaluator for UniversalEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Universal
    }

    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure> {
        let missing = data.missing(&spec.data_fields);
        if !missing.is_empty() {
            return Ok(self.missing_data(spec, data, missing).await);
        }

        let subset = data.subset(&spec.data_fields);
        let mut result = match spec.complexity {
            Complexity::MultiStep => self.multi_step(spec, &subset).await?,
            complexity => {
                let prompt = match complexity {
                    Complexity::Quantitative => {
                        EvaluatorPromptTemplate::quantitative_prompt(spec, &subset)
                    }
                    Complexity::Comparative => {
                        EvaluatorPromptTemplate::comparative_prompt(spec, &subset)
                    }
                    _ => EvaluatorPromptTemplate::simple_prompt(spec, &subset),
                };
                let verdict = self.reasoning.verdict(prompt).await?;
                from_verdict(spec, verdict, self.kind())
            }
        };

        if !result.details.is_object() {
            result.details = json!({});
        }
        result.details["mode"] = json!(spec.complexity.as_str());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::ports::reasoning_service::ReasoningError;
    use policy_domain::{ArchetypeParams, QualitativeParams};
    use std::sync::Arc;

    fn spec(complexity: Complexity) -> AgentSpec {
        AgentSpec::new(
            "Peer Leverage",
            "Leverage should be below the industry peer median",
            ArchetypeParams::Qualitative(QualitativeParams {
                assessment_criteria: vec!["peer comparison".into()],
            }),
        )
        .with_complexity(complexity)
        .with_data_fields(["leverage"])
    }

    fn data() -> ExtractedData {
        ExtractedData::new().with("leverage", json!(2.1))
    }

    fn verdict(passed: bool) -> Result<Value, ReasoningError> {
        Ok(json!({"passed": passed, "confidence": 0.75, "reason": "ok"}))
    }

    #[tokio::test]
    async fn test_mode_follows_complexity() {
        let cases = [
            (Complexity::Simple, "policy compliance specialist"),
            (Complexity::Quantitative, "quantitative analyst"),
            (Complexity::Comparative, "comparative analyst"),
        ];
        for (complexity, marker) in cases {
            let service = Arc::new(ScriptedReasoning::new(vec![verdict(true)]));
            let result = UniversalEvaluator::new(client(&service))
                .evaluate(&spec(complexity), &data())
                .await
                .unwrap();
            assert_eq!(result.evaluator, EvaluatorKind::Universal);
            assert_eq!(result.details["mode"], complexity.as_str());
            assert!(service.prompt(0).contains(marker), "{:?}", complexity);
        }
    }

    #[tokio::test]
    async fn test_multi_step_runs_planned_steps() {
        let service = Arc::new(ScriptedReasoning::new(vec![
            Ok(json!({"steps": ["Find peer median", "Compare leverage"]})),
            verdict(true),
            verdict(true),
            Ok(json!({"passed": false, "confidence": 0.8, "reason": "above median"})),
        ]));

        let result = UniversalEvaluator::new(client(&service))
            .evaluate(&spec(Complexity::MultiStep), &data())
            .await
            .unwrap();

        assert_eq!(service.calls(), 4);
        assert_eq!(result.passed, Some(false));
        assert_eq!(result.details["steps"].as_array().unwrap().len(), 2);
        assert!(service.prompt(2).contains("Current Step: Compare leverage"));
        assert!(service.prompt(3).contains("Synthesize"));
    }

    #[tokio::test]
    async fn test_multi_step_falls_back_to_default_steps() {
        let service = Arc::new(ScriptedReasoning::new(vec![
            Err(ReasoningError::MalformedOutput("no steps".into())),
            verdict(true),
            verdict(true),
            verdict(true),
            verdict(true),
        ]));

        let result = UniversalEvaluator::new(client(&service))
            .evaluate(&spec(Complexity::MultiStep), &data())
            .await
            .unwrap();

        assert_eq!(result.passed, Some(true));
        assert_eq!(service.calls(), 5);
        assert!(service.prompt(1).contains("Current Step: Analyze data"));
    }

    #[tokio::test]
    async fn test_missing_data_not_applicable() {
        let service = Arc::new(ScriptedReasoning::new(vec![Ok(json!({
            "applicable": false,
            "reason": "Company has no debt"
        }))]));

        let result = UniversalEvaluator::new(client(&service))
            .evaluate(&spec(Complexity::Simple), &ExtractedData::new())
            .await
            .unwrap();

        assert!(result.is_inconclusive());
        assert_eq!(result.reason, "Not applicable: Company has no debt");
        assert_eq!(result.details["applicable"], false);
    }

    #[tokio::test]
    async fn test_missing_data_applicability_failure() {
        let service = Arc::new(ScriptedReasoning::new(vec![Err(ReasoningError::Timeout)]));

        let result = UniversalEvaluator::new(client(&service))
            .evaluate(&spec(Complexity::Simple), &ExtractedData::new())
            .await
            .unwrap();

        assert!(result.is_inconclusive());
        assert_eq!(result.reason, "Missing required data: leverage");
    }
}
