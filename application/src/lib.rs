//! Application layer for policy-agents
//!
//! This crate contains use cases, evaluators, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod evaluators;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{PipelineConfig, RetryPolicy};
pub use evaluators::{AgentFactory, EvaluationFailure, Evaluator, EvaluatorProvider};
pub use ports::{
    document_parser::{DocumentParseError, DocumentParser},
    progress::{NoProgress, PipelineProgress},
    reasoning_service::{ReasoningError, ReasoningRequest, ReasoningService},
    rule_graph::{NoRuleGraph, RuleGraph, RuleGraphError},
    run_logger::{NoRunLogger, RunEvent, RunLogger},
};
pub use use_cases::build_catalog::{
    BuildCatalogError, BuildCatalogInput, BuildCatalogOutput, BuildCatalogUseCase,
};
pub use use_cases::extract_data::{ExtractDataError, ExtractDataUseCase, parse_data_file};
pub use use_cases::extract_requirements::{
    ExtractionFailure, ExtractionOutcome, RequirementExtractor,
};
pub use use_cases::orchestrator::{Orchestrator, RunContext, RunError};
pub use use_cases::run_compliance::{
    ComplianceReport, RunComplianceError, RunComplianceInput, RunComplianceUseCase,
};
