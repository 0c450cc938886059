//! Requirement extraction
//!
//! One reasoning call per chunk. Chunks run concurrently up to the
//! configured limit; candidates come back in chunk order no matter which
//! call finishes first.

use crate::config::{PipelineConfig, RetryPolicy};
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::reasoning_service::{ReasoningError, ReasoningRequest, ReasoningService};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use futures::stream::{self, StreamExt};
use policy_domain::{DocumentChunk, OutputSchema, PolicyDomain, PromptTemplate, RawCandidate};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A chunk whose extraction failed. Siblings are unaffected.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("Extraction failed for chunk {chunk_ordinal}: {reason}")]
pub struct ExtractionFailure {
    pub chunk_ordinal: usize,
    pub reason: String,
}

/// Merged output of [`RequirementExtractor::extract_all`].
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// Candidates in chunk order, then response order within a chunk
    pub candidates: Vec<RawCandidate>,
    pub failures: Vec<ExtractionFailure>,
}

pub struct RequirementExtractor {
    reasoning: Arc<dyn ReasoningService>,
    retry: RetryPolicy,
    call_timeout: Option<Duration>,
    concurrency: usize,
    logger: Arc<dyn RunLogger>,
}

impl RequirementExtractor {
    pub fn new(reasoning: Arc<dyn ReasoningService>) -> Self {
        Self {
            reasoning,
            retry: RetryPolicy::default(),
            call_timeout: None,
            concurrency: 4,
            logger: Arc::new(NoRunLogger),
        }
    }

    pub fn from_config(reasoning: Arc<dyn ReasoningService>, config: &PipelineConfig) -> Self {
        Self::new(reasoning)
            .with_retry(config.retry.clone())
            .with_call_timeout(config.call_timeout)
            .with_concurrency(config.extraction_concurrency)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_run_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    async fn call(&self, request: &ReasoningRequest) -> Result<Value, ReasoningError> {
        let attempt = || async {
            match self.call_timeout {
                Some(limit) => tokio::time::timeout(limit, self.reasoning.complete(request))
                    .await
                    .unwrap_or(Err(ReasoningError::Timeout)),
                None => self.reasoning.complete(request).await,
            }
        };
        self.retry.run(attempt).await
    }

    /// Extract candidates from one chunk.
    ///
    /// Candidates without `requirement_text` or `data_fields` are dropped here.
    pub async fn extract(
        &self,
        chunk: &DocumentChunk,
        domain_hint: Option<PolicyDomain>,
    ) -> Result<Vec<RawCandidate>, ExtractionFailure> {
        let failure = |reason: String| ExtractionFailure {
            chunk_ordinal: chunk.ordinal,
            reason,
        };

        let request = ReasoningRequest::new(
            PromptTemplate::extraction_system(),
            PromptTemplate::extraction_prompt(chunk, domain_hint),
            OutputSchema::requirements(),
        );
        let response = self.call(&request).await.map_err(|e| failure(e.to_string()))?;

        let Some(items) = response.get("requirements").and_then(Value::as_array) else {
            return Err(failure(
                ReasoningError::MalformedOutput("missing \"requirements\" array".to_string())
                    .to_string(),
            ));
        };

        let mut candidates = Vec::with_capacity(items.len());
        for item in items {
            let Some(candidate) = RawCandidate::from_value(chunk.ordinal, item.clone()) else {
                debug!("Chunk {}: skipping non-object requirement", chunk.ordinal);
                continue;
            };
            if let Some(field) = candidate.missing_required() {
                info!(
                    "Chunk {}: dropping candidate without {}",
                    chunk.ordinal, field
                );
                self.logger.log(RunEvent::new(
                    "candidate_rejected",
                    json!({
                        "chunk_ordinal": chunk.ordinal,
                        "requirement_text": candidate.requirement_text(),
                        "reason": format!("Missing mandatory field: {}", field),
                    }),
                ));
                continue;
            }
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    /// Extract from every chunk with default (no-op) progress.
    pub async fn extract_all(
        &self,
        chunks: &[DocumentChunk],
        domain_hint: Option<PolicyDomain>,
    ) -> ExtractionOutcome {
        self.extract_all_with_progress(chunks, domain_hint, &NoProgress)
            .await
    }

    /// Extract from every chunk with progress callbacks.
    pub async fn extract_all_with_progress(
        &self,
        chunks: &[DocumentChunk],
        domain_hint: Option<PolicyDomain>,
        progress: &dyn PipelineProgress,
    ) -> ExtractionOutcome {
        info!(
            "Extracting requirements from {} chunks (concurrency {})",
            chunks.len(),
            self.concurrency
        );
        progress.on_extraction_start(chunks.len());

        // `buffered` yields in input order while running up to `concurrency` calls.
        let mut results = stream::iter(chunks)
            .map(|chunk| async move { (chunk.ordinal, self.extract(chunk, domain_hint).await) })
            .buffered(self.concurrency);

        let mut outcome = ExtractionOutcome::default();
        while let Some((ordinal, result)) = results.next().await {
            match result {
                Ok(candidates) => {
                    debug!("Chunk {}: {} candidates", ordinal, candidates.len());
                    self.logger.log(RunEvent::new(
                        "chunk_extracted",
                        json!({ "chunk_ordinal": ordinal, "candidates": candidates.len() }),
                    ));
                    progress.on_chunk_extracted(ordinal, true);
                    outcome.candidates.extend(candidates);
                }
                Err(failure) => {
                    warn!("{}", failure);
                    self.logger.log(RunEvent::new(
                        "chunk_failed",
                        json!({ "chunk_ordinal": ordinal, "reason": failure.reason }),
                    ));
                    progress.on_chunk_extracted(ordinal, false);
                    outcome.failures.push(failure);
                }
            }
        }

        progress.on_extraction_complete();
        outcome
    }
}
