//! Run compliance use case
//!
//! Selected agents + extracted data → results + summary.

use super::orchestrator::{Orchestrator, RunContext, RunError};
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use chrono::{DateTime, Utc};
use policy_domain::{
    AgentCatalog, AgentResult, ComplianceSummary, DEFAULT_MAX_RECOMMENDATIONS, ExtractedData,
    summarize,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunComplianceError {
    #[error("No agents selected")]
    EmptySelection,

    #[error("Unknown agent ids: {}", .0.join(", "))]
    UnknownAgents(Vec<String>),

    #[error(transparent)]
    Run(#[from] RunError),
}

#[derive(Debug, Clone)]
pub struct RunComplianceInput {
    pub document_id: String,
    pub selected_agent_ids: Vec<String>,
    pub data: ExtractedData,
}

impl RunComplianceInput {
    pub fn new(
        document_id: impl Into<String>,
        selected_agent_ids: Vec<String>,
        data: ExtractedData,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            selected_agent_ids,
            data,
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub context: RunContext,
    pub results: Vec<AgentResult>,
    pub summary: ComplianceSummary,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

pub struct RunComplianceUseCase {
    orchestrator: Orchestrator,
    max_recommendations: usize,
    logger: Arc<dyn RunLogger>,
}

impl RunComplianceUseCase {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            logger: Arc::new(NoRunLogger),
        }
    }

    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    pub fn with_run_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(
        &self,
        catalog: &AgentCatalog,
        input: RunComplianceInput,
    ) -> Result<ComplianceReport, RunComplianceError> {
        self.execute_with_progress(catalog, input, &CancellationToken::new(), &NoProgress)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        catalog: &AgentCatalog,
        input: RunComplianceInput,
        cancel: &CancellationToken,
        progress: &dyn PipelineProgress,
    ) -> Result<ComplianceReport, RunComplianceError> {
        if input.selected_agent_ids.is_empty() {
            return Err(RunComplianceError::EmptySelection);
        }
        let specs = catalog
            .select(&input.selected_agent_ids)
            .map_err(RunComplianceError::UnknownAgents)?;

        let started_at = Utc::now();
        let context = RunContext::new(input.document_id, input.selected_agent_ids);
        info!(
            "Run {}: {} agents against {} data fields",
            context.run_id,
            specs.len(),
            input.data.len()
        );

        let results = self
            .orchestrator
            .run_with_progress(&context, specs, Arc::new(input.data), cancel, progress)
            .await?;
        let summary = summarize(&results, self.max_recommendations);

        info!(
            "Run {}: {} ({} passed, {} failed, {} inconclusive)",
            context.run_id,
            summary.overall_status,
            summary.statistics.passed_agents,
            summary.statistics.failed_agents,
            summary.statistics.inconclusive_agents
        );
        self.logger.log(RunEvent::new(
            "run_completed",
            json!({
                "run_id": context.run_id,
                "document_id": context.document_id,
                "statistics": summary.statistics,
                "overall_status": summary.overall_status,
                "decision": summary.decision,
            }),
        ));

        Ok(ComplianceReport {
            context,
            results,
            summary,
            started_at,
            completed_at: Utc::now(),
        })
    }
}
