//! Orchestrator
//!
//! Runs one evaluator per agent spec concurrently, bounded by a semaphore.
//! Each task has its own timeout; failures, timeouts, and panics become
//! inconclusive results so a single agent can never sink the run. Results
//! come back in input order.

use crate::config::PipelineConfig;
use crate::evaluators::EvaluatorProvider;
use crate::ports::progress::{NoProgress, PipelineProgress};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use futures::FutureExt;
use policy_domain::{AgentResult, AgentSpec, EvaluatorKind, ExtractedData};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a whole run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("No agent specs to evaluate")]
    NoSpecs,

    #[error("Duplicate agent id: {0}")]
    DuplicateAgentId(String),

    #[error("Run cancelled")]
    Cancelled,
}

impl RunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled)
    }
}

/// Caller-held identity of one compliance run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub run_id: String,
    pub document_id: String,
    pub selected_agent_ids: Vec<String>,
}

impl RunContext {
    pub fn new(document_id: impl Into<String>, selected_agent_ids: Vec<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            selected_agent_ids,
        }
    }
}

pub struct Orchestrator {
    provider: Arc<dyn EvaluatorProvider>,
    concurrency_limit: usize,
    task_timeout: Duration,
    logger: Arc<dyn RunLogger>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn EvaluatorProvider>,
        concurrency_limit: usize,
        task_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            concurrency_limit: concurrency_limit.max(1),
            task_timeout,
            logger: Arc::new(NoRunLogger),
        }
    }

    pub fn from_config(provider: Arc<dyn EvaluatorProvider>, config: &PipelineConfig) -> Self {
        Self::new(provider, config.concurrency_limit, config.task_timeout)
    }

    pub fn with_run_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Run without progress reporting or external cancellation.
    pub async fn run(
        &self,
        context: &RunContext,
        specs: Vec<AgentSpec>,
        data: Arc<ExtractedData>,
    ) -> Result<Vec<AgentResult>, RunError> {
        self.run_with_progress(context, specs, data, &CancellationToken::new(), &NoProgress)
            .await
    }

    /// Run every spec and return one result per spec, in input order.
    ///
    /// Cancelling `cancel` aborts in-flight tasks and returns
    /// [`RunError::Cancelled`] without partial results.
    pub async fn run_with_progress(
        &self,
        context: &RunContext,
        specs: Vec<AgentSpec>,
        data: Arc<ExtractedData>,
        cancel: &CancellationToken,
        progress: &dyn PipelineProgress,
    ) -> Result<Vec<AgentResult>, RunError> {
        if specs.is_empty() {
            return Err(RunError::NoSpecs);
        }
        {
            let mut seen = HashSet::new();
            if let Some(dup) = specs.iter().find(|s| !seen.insert(s.agent_id.as_str())) {
                return Err(RunError::DuplicateAgentId(dup.agent_id.clone()));
            }
        }

        info!(
            "Run {}: evaluating {} agents (concurrency {}, timeout {:?})",
            context.run_id,
            specs.len(),
            self.concurrency_limit,
            self.task_timeout
        );
        progress.on_evaluation_start(specs.len());

        let specs: Vec<Arc<AgentSpec>> = specs.into_iter().map(Arc::new).collect();
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let mut join_set = JoinSet::new();
        // Tasks report the index once they hold a permit.
        let (started_tx, mut started_rx) = mpsc::unbounded_channel::<usize>();

        for (index, spec) in specs.iter().enumerate() {
            let spec = Arc::clone(spec);
            let data = Arc::clone(&data);
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let started = started_tx.clone();
            let timeout = self.task_timeout;

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    let kind = EvaluatorKind::from(spec.archetype);
                    return (index, AgentResult::inconclusive(&spec, "Evaluation aborted", kind));
                };
                let _ = started.send(index);
                (index, Self::evaluate_one(provider, &spec, &data, timeout).await)
            });
        }
        drop(started_tx);

        let mut slots: Vec<Option<AgentResult>> = vec![None; specs.len()];
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Run {} cancelled, aborting {} tasks", context.run_id, join_set.len());
                    join_set.abort_all();
                    return Err(RunError::Cancelled);
                }
                Some(index) = started_rx.recv() => progress.on_agent_start(&specs[index]),
                next = join_set.join_next() => match next {
                    None => break,
                    Some(Ok((index, result))) => {
                        debug!(
                            "Agent {} finished: {:?} ({})",
                            result.agent_id, result.passed, result.evaluator
                        );
                        self.logger.log(RunEvent::new(
                            "agent_evaluated",
                            json!({
                                "run_id": context.run_id,
                                "agent_id": result.agent_id,
                                "passed": result.passed,
                                "confidence": result.confidence,
                                "evaluator": result.evaluator,
                                "origin": result.origin,
                                "reason": result.reason,
                            }),
                        ));
                        progress.on_agent_complete(&result);
                        slots[index] = Some(result);
                    }
                    Some(Err(e)) => warn!("Agent task join error: {}", e),
                },
            }
        }

        progress.on_evaluation_complete();

        Ok(slots
            .into_iter()
            .zip(specs.iter())
            .map(|(slot, spec)| {
                slot.unwrap_or_else(|| {
                    AgentResult::inconclusive(
                        spec,
                        "Evaluation task aborted",
                        EvaluatorKind::from(spec.archetype),
                    )
                })
            })
            .collect())
    }

    async fn evaluate_one(
        provider: Arc<dyn EvaluatorProvider>,
        spec: &AgentSpec,
        data: &ExtractedData,
        timeout: Duration,
    ) -> AgentResult {
        let fallback_kind = EvaluatorKind::from(spec.archetype);
        // Evaluator creation may hit the rule graph, so it runs under the timeout too.
        let evaluation = AssertUnwindSafe(async {
            let evaluator = provider.create(spec).await;
            let kind = evaluator.kind();
            (kind, evaluator.evaluate(spec, data).await)
        })
        .catch_unwind();

        match tokio::time::timeout(timeout, evaluation).await {
            Ok(Ok((_, Ok(result)))) => result,
            Ok(Ok((kind, Err(failure)))) => {
                warn!("Agent {} evaluation failed: {}", spec.agent_id, failure);
                AgentResult::inconclusive(spec, format!("Evaluation failed: {}", failure), kind)
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                warn!("Agent {} evaluator panicked: {}", spec.agent_id, message);
                AgentResult::inconclusive(
                    spec,
                    format!("Evaluator panicked: {}", message),
                    fallback_kind,
                )
            }
            Err(_) => {
                warn!("Agent {} timed out after {:?}", spec.agent_id, timeout);
                AgentResult::inconclusive(
                    spec,
                    format!("Evaluation timed out after {}s", timeout.as_secs_f64()),
                    fallback_kind,
                )
                .with_details(json!({ "timeout": true }))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
