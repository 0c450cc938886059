//! Assessment data extraction use case
//!
//! Asks the reasoning service for every data field the selected agents
//! need, keeping value, confidence, and location per field.

use crate::config::RetryPolicy;
use crate::ports::reasoning_service::{ReasoningError, ReasoningRequest, ReasoningService};
use policy_domain::{AgentSpec, ExtractedData, NormalizedDocument, OutputSchema, PromptTemplate};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractDataError {
    #[error("Reasoning failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Malformed extraction output: {0}")]
    MalformedOutput(String),
}

pub struct ExtractDataUseCase {
    reasoning: Arc<dyn ReasoningService>,
    retry: RetryPolicy,
}

impl ExtractDataUseCase {
    pub fn new(reasoning: Arc<dyn ReasoningService>, retry: RetryPolicy) -> Self {
        Self { reasoning, retry }
    }

    pub async fn execute(
        &self,
        document: &NormalizedDocument,
        specs: &[AgentSpec],
    ) -> Result<ExtractedData, ExtractDataError> {
        let fields: Vec<String> = specs
            .iter()
            .flat_map(|s| s.data_fields.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if fields.is_empty() {
            return Ok(ExtractedData::new());
        }
        info!(
            "Extracting {} data fields from {}",
            fields.len(),
            document.source
        );

        let request = ReasoningRequest::new(
            PromptTemplate::data_extraction_system(),
            PromptTemplate::data_extraction_prompt(&document.flatten(), &fields),
            OutputSchema::extracted_fields(),
        );
        let response = self
            .retry
            .run(|| self.reasoning.complete(&request))
            .await?;

        let extracted = response
            .get("fields")
            .cloned()
            .and_then(ExtractedData::from_json)
            .ok_or_else(|| ExtractDataError::MalformedOutput("missing \"fields\" object".into()))?;

        // Only keep what was asked for.
        let mut data = ExtractedData::new();
        for (field, value) in extracted.iter() {
            if fields.contains(field) && value.is_present() {
                data.insert(field.clone(), value.clone());
            } else {
                debug!("Ignoring unrequested or empty field {}", field);
            }
        }
        info!("Extracted {}/{} fields", data.len(), fields.len());
        Ok(data)
    }
}

/// Parse a JSON data file: either `{"fields": {...}}` or a bare field map.
pub fn parse_data_file(value: Value) -> Option<ExtractedData> {
    match value {
        Value::Object(ref map)
            if map.len() == 1 && map.get("fields").is_some_and(Value::is_object) =>
        {
            map.get("fields").cloned().and_then(ExtractedData::from_json)
        }
        other => ExtractedData::from_json(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use policy_domain::{ArchetypeParams, TextBlock, ThresholdParams, ThresholdType};
    use serde_json::json;
    use std::sync::Mutex;

    struct MockReasoning {
        response: Result<Value, ReasoningError>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReasoningService for MockReasoning {
        async fn complete(&self, request: &ReasoningRequest) -> Result<Value, ReasoningError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.response.clone()
        }
    }

    fn specs() -> Vec<AgentSpec> {
        vec![
            AgentSpec::new(
                "Credit",
                "Credit score must be at least 650",
                ArchetypeParams::Threshold(ThresholdParams::new(ThresholdType::Min, 650.0)),
            )
            .with_data_fields(["credit_score"]),
            AgentSpec::new(
                "DTI",
                "DTI must not exceed 43%",
                ArchetypeParams::Threshold(ThresholdParams::new(ThresholdType::Max, 43.0)),
            )
            .with_data_fields(["monthly_debt", "credit_score"]),
        ]
    }

    fn document() -> NormalizedDocument {
        NormalizedDocument::new(
            "app.txt",
            vec![TextBlock::paragraph("FICO 712. Debt $2,100/month.")],
        )
    }

    #[tokio::test]
    async fn test_extracts_requested_fields() {
        let service = Arc::new(MockReasoning {
            response: Ok(json!({"fields": {
                "credit_score": {"value": 712, "confidence": 0.95, "source_location": "page 1"},
                "monthly_debt": {"value": 2100, "confidence": 0.8},
                "favorite_color": {"value": "blue"}
            }})),
            prompts: Mutex::new(Vec::new()),
        });

        let data = ExtractDataUseCase::new(service.clone(), RetryPolicy::none())
            .execute(&document(), &specs())
            .await
            .unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.number("credit_score"), Some(712.0));
        assert_eq!(data.get("credit_score").unwrap().confidence, 0.95);
        assert!(data.get("favorite_color").is_none());
        let prompt = service.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("- credit_score\n- monthly_debt"));
    }

    #[tokio::test]
    async fn test_malformed_output() {
        let service = Arc::new(MockReasoning {
            response: Ok(json!(["credit_score"])),
            prompts: Mutex::new(Vec::new()),
        });
        let err = ExtractDataUseCase::new(service, RetryPolicy::none())
            .execute(&document(), &specs())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractDataError::MalformedOutput(_)));
    }

    #[test]
    fn test_parse_data_file_shapes() {
        let wrapped = parse_data_file(json!({"fields": {"credit_score": {"value": 700}}})).unwrap();
        assert_eq!(wrapped.number("credit_score"), Some(700.0));

        let bare = parse_data_file(json!({"credit_score": 700, "has_license": true})).unwrap();
        assert_eq!(bare.len(), 2);

        assert!(parse_data_file(json!([1, 2])).is_none());
    }
}
