//! Build agent catalog use case
//!
//! Policy document → chunks → candidates → agent specs, grouped by archetype.

use super::extract_requirements::{ExtractionFailure, RequirementExtractor};
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use policy_domain::{
    AgentCatalog, CatalogValidation, ChunkingError, Chunker, NormalizedDocument, PolicyDomain,
    RejectedCandidate, classify_all,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BuildCatalogError {
    #[error("Chunking failed: {0}")]
    Chunking(#[from] ChunkingError),
}

#[derive(Debug, Clone)]
pub struct BuildCatalogInput {
    pub document: NormalizedDocument,
    pub domain_hint: Option<PolicyDomain>,
}

impl BuildCatalogInput {
    pub fn new(document: NormalizedDocument) -> Self {
        Self {
            document,
            domain_hint: None,
        }
    }

    pub fn with_domain_hint(mut self, hint: Option<PolicyDomain>) -> Self {
        self.domain_hint = hint;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildCatalogOutput {
    pub catalog: AgentCatalog,
    pub validation: CatalogValidation,
    pub chunk_count: usize,
    pub extraction_failures: Vec<ExtractionFailure>,
    pub rejected: Vec<RejectedCandidate>,
    /// Agent ids dropped because an identical requirement was already cataloged
    pub duplicates: Vec<String>,
}

pub struct BuildCatalogUseCase {
    extractor: RequirementExtractor,
    chunker: Chunker,
    logger: Arc<dyn RunLogger>,
}

impl BuildCatalogUseCase {
    pub fn new(extractor: RequirementExtractor, chunker: Chunker) -> Self {
        Self {
            extractor,
            chunker,
            logger: Arc::new(NoRunLogger),
        }
    }

    pub fn with_run_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(
        &self,
        input: BuildCatalogInput,
    ) -> Result<BuildCatalogOutput, BuildCatalogError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: BuildCatalogInput,
        progress: &dyn PipelineProgress,
    ) -> Result<BuildCatalogOutput, BuildCatalogError> {
        // Chunking errors abort before any reasoning call.
        let chunks = self.chunker.chunk_document(&input.document)?;
        info!(
            "Document {}: {} chunks (budget {} tokens)",
            input.document.source,
            chunks.len(),
            self.chunker.max_tokens()
        );

        let extraction = self
            .extractor
            .extract_all_with_progress(&chunks, input.domain_hint, progress)
            .await;

        let (specs, rejected) = classify_all(extraction.candidates.iter());
        for rejection in &rejected {
            warn!(
                "Chunk {}: rejected candidate: {}",
                rejection.chunk_ordinal, rejection.reason
            );
            self.logger.log(RunEvent::new(
                "candidate_rejected",
                json!({
                    "chunk_ordinal": rejection.chunk_ordinal,
                    "requirement_text": rejection.requirement_text,
                    "reason": rejection.reason,
                }),
            ));
        }

        let (catalog, duplicates) = AgentCatalog::from_specs(specs);
        let validation = catalog.validate();
        info!(
            "Catalog: {} agents, {} rejected, {} duplicates, {} failed chunks",
            catalog.len(),
            rejected.len(),
            duplicates.len(),
            extraction.failures.len()
        );
        self.logger.log(RunEvent::new(
            "catalog_built",
            json!({
                "source": input.document.source,
                "chunks": chunks.len(),
                "agents": catalog.len(),
                "rejected": rejected.len(),
                "failed_chunks": extraction.failures.len(),
            }),
        ));

        Ok(BuildCatalogOutput {
            catalog,
            validation,
            chunk_count: chunks.len(),
            extraction_failures: extraction.failures,
            rejected,
            duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::reasoning_service::{ReasoningError, ReasoningRequest, ReasoningService};
    use async_trait::async_trait;
    use policy_domain::{Archetype, TextBlock};
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockReasoning {
        responses: Mutex<VecDeque<Result<Value, ReasoningError>>>,
        calls: Mutex<usize>,
    }

    impl MockReasoning {
        fn new(responses: Vec<Result<Value, ReasoningError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ReasoningService for MockReasoning {
        async fn complete(&self, _request: &ReasoningRequest) -> Result<Value, ReasoningError> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ReasoningError::ServiceUnavailable("No more responses".into()))
                })
        }
    }

    fn use_case(service: Arc<MockReasoning>) -> BuildCatalogUseCase {
        BuildCatalogUseCase::new(
            RequirementExtractor::new(service).with_concurrency(1),
            Chunker::default(),
        )
    }

    #[tokio::test]
    async fn test_builds_catalog_from_document() {
        let service = Arc::new(MockReasoning::new(vec![Ok(json!({"requirements": [
            {
                "requirement_text": "Credit score must be at least 650",
                "data_fields": ["credit_score"],
                "agent_name": "Credit Score Minimum",
                "priority": "critical"
            },
            {
                "requirement_text": "Applicant must hold a valid business license",
                "data_fields": ["has_business_license"],
                "expected_value": "yes"
            },
            {
                "requirement_text": "Credit score must be at least 650",
                "data_fields": ["credit_score"]
            },
            {
                "requirement_text": "Broken candidate",
                "data_fields": [1, 2]
            }
        ]}))]));
        let document = NormalizedDocument::new(
            "policy.md",
            vec![
                TextBlock::heading("Lending Policy"),
                TextBlock::paragraph(
                    "Credit score must be at least 650. Applicants must hold a valid business license.",
                ),
            ],
        );

        let output = use_case(service.clone())
            .execute(BuildCatalogInput::new(document))
            .await
            .unwrap();

        assert_eq!(output.chunk_count, 1);
        assert_eq!(output.catalog.len(), 2);
        assert_eq!(output.catalog.group(Archetype::Threshold).len(), 1);
        assert_eq!(output.catalog.group(Archetype::Criteria).len(), 1);
        assert_eq!(output.duplicates.len(), 1);
        assert_eq!(output.rejected.len(), 1);
        assert!(output.extraction_failures.is_empty());
        assert_eq!(*service.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_document_fails_before_reasoning() {
        let service = Arc::new(MockReasoning::new(vec![]));
        let document = NormalizedDocument::new("empty.txt", vec![TextBlock::paragraph("   ")]);

        let err = use_case(service.clone())
            .execute(BuildCatalogInput::new(document))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildCatalogError::Chunking(ChunkingError::EmptyInput)));
        assert_eq!(*service.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_chunk_reported() {
        let service = Arc::new(MockReasoning::new(vec![Err(ReasoningError::MalformedOutput(
            "not json".into(),
        ))]));
        let document = NormalizedDocument::new(
            "policy.txt",
            vec![TextBlock::paragraph("Credit score must be at least 650.")],
        );

        let output = use_case(service)
            .execute(BuildCatalogInput::new(document))
            .await
            .unwrap();

        assert!(output.catalog.is_empty());
        assert_eq!(output.extraction_failures.len(), 1);
        assert_eq!(output.extraction_failures[0].chunk_ordinal, 0);
    }
}
