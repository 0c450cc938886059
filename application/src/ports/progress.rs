//! Progress notification port
//!
//! Defines the interface for reporting progress during a pipeline run.

use policy_domain::{AgentResult, AgentSpec};

/// Callback for progress updates
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain log lines, nothing).
pub trait PipelineProgress: Send + Sync {
    /// Called when requirement extraction starts
    fn on_extraction_start(&self, _total_chunks: usize) {}

    /// Called when one chunk finishes extraction
    fn on_chunk_extracted(&self, _ordinal: usize, _success: bool) {}

    /// Called when requirement extraction completes
    fn on_extraction_complete(&self) {}

    /// Called when agent evaluation starts
    fn on_evaluation_start(&self, _total_agents: usize) {}

    /// Called when an agent task acquires its permit
    fn on_agent_start(&self, _spec: &AgentSpec) {}

    /// Called when an agent produces its result
    fn on_agent_complete(&self, _result: &AgentResult) {}

    /// Called when agent evaluation completes
    fn on_evaluation_complete(&self) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl PipelineProgress for NoProgress {}
