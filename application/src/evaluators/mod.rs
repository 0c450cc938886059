//! Agent evaluators
//!
//! One evaluator per archetype, a universal fallback that picks its
//! reasoning mode from the spec's complexity, and a hybrid evaluator that
//! combines an authoritative rule with reasoning. The [`AgentFactory`]
//! chooses among them.

pub mod criteria;
pub mod factory;
pub mod hybrid;
pub mod qualitative;
pub mod score;
pub mod threshold;
pub mod universal;

pub use criteria::CriteriaEvaluator;
pub use factory::{AgentFactory, EvaluatorProvider};
pub use hybrid::HybridEvaluator;
pub use qualitative::QualitativeEvaluator;
pub use score::ScoreEvaluator;
pub use threshold::ThresholdEvaluator;
pub use universal::UniversalEvaluator;

use crate::config::RetryPolicy;
use crate::ports::reasoning_service::{ReasoningError, ReasoningRequest, ReasoningService};
use async_trait::async_trait;
use policy_domain::{
    AgentResult, AgentSpec, Archetype, EvaluatorKind, EvaluatorPromptTemplate, ExtractedData,
    OutputSchema, ReasonedVerdict, parse_verdict, util::truncate_str,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Per-agent evaluation failure; the orchestrator turns it into an
/// inconclusive result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationFailure {
    #[error("Reasoning failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Malformed verdict: {0}")]
    MalformedVerdict(String),

    #[error("{evaluator} evaluator cannot evaluate a {actual} agent")]
    ArchetypeMismatch {
        evaluator: EvaluatorKind,
        actual: Archetype,
    },
}

/// A compliance check implementation.
#[async_trait]
pub trait Evaluator: Send + Sync {
    fn kind(&self) -> EvaluatorKind;

    /// Evaluate `spec` against `data`. Missing data is an inconclusive
    /// result, not an error.
    async fn evaluate(
        &self,
        spec: &AgentSpec,
        data: &ExtractedData,
    ) -> Result<AgentResult, EvaluationFailure>;
}

/// Reasoning handle plus retry policy shared by all evaluators.
#[derive(Clone)]
pub struct ReasoningClient {
    service: Arc<dyn ReasoningService>,
    retry: RetryPolicy,
}

impl ReasoningClient {
    pub fn new(service: Arc<dyn ReasoningService>, retry: RetryPolicy) -> Self {
        Self { service, retry }
    }

    /// Raw structured completion with the evaluator system prompt.
    pub async fn complete(
        &self,
        prompt: String,
        schema: OutputSchema,
    ) -> Result<serde_json::Value, ReasoningError> {
        let request =
            ReasoningRequest::new(EvaluatorPromptTemplate::evaluator_system(), prompt, schema);
        self.retry.run(|| self.service.complete(&request)).await
    }

    /// Ask for a verdict and parse it.
    pub async fn verdict(&self, prompt: String) -> Result<ReasonedVerdict, EvaluationFailure> {
        let value = self.complete(prompt, OutputSchema::verdict()).await?;
        parse_verdict(&value).ok_or_else(|| {
            let raw = value.to_string();
            EvaluationFailure::MalformedVerdict(truncate_str(&raw, 200).to_string())
        })
    }
}

/// Inconclusive result citing missing fields, or `None` when every field
/// the spec needs is present.
pub(crate) fn missing_data_result(
    spec: &AgentSpec,
    data: &ExtractedData,
    evaluator: EvaluatorKind,
) -> Option<AgentResult> {
    let missing = data.missing(&spec.data_fields);
    if missing.is_empty() {
        return None;
    }
    Some(
        AgentResult::inconclusive(
            spec,
            format!("Missing required data: {}", missing.join(", ")),
            evaluator,
        )
        .with_details(json!({ "missing_fields": missing })),
    )
}

/// Value of the only data field, when the spec needs exactly one.
pub(crate) fn single_field(spec: &AgentSpec) -> Option<&String> {
    match spec.data_fields.len() {
        1 => spec.data_fields.iter().next(),
        _ => None,
    }
}

/// Result from a parsed verdict.
pub(crate) fn from_verdict(
    spec: &AgentSpec,
    verdict: ReasonedVerdict,
    evaluator: EvaluatorKind,
) -> AgentResult {
    let reason = if verdict.reason.is_empty() {
        "No reason given".to_string()
    } else {
        verdict.reason
    };
    AgentResult::verdict(spec, verdict.passed, verdict.confidence, reason, evaluator)
        .with_details(verdict.details)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted reasoning service shared by evaluator tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub struct ScriptedReasoning {
        responses: Mutex<VecDeque<Result<serde_json::Value, ReasoningError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedReasoning {
        pub fn new(responses: Vec<Result<serde_json::Value, ReasoningError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ReasoningService for ScriptedReasoning {
        async fn complete(
            &self,
            request: &ReasoningRequest,
        ) -> Result<serde_json::Value, ReasoningError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ReasoningError::ServiceUnavailable(
                        "No more responses".to_string(),
                    ))
                })
        }
    }

    pub fn client(service: &Arc<ScriptedReasoning>) -> ReasoningClient {
        ReasoningClient::new(service.clone(), RetryPolicy::none())
    }
}
