//! Domain layer for policy-agents
//!
//! This crate contains the pure logic of the pipeline: chunking, requirement
//! classification, agent specs and results, compliance aggregation, and the
//! prompt templates used to talk to the reasoning service.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents
//!
//! An agent is one executable compliance check derived from one policy
//! requirement. Its [`AgentSpec`] names the archetype (threshold, criteria,
//! score, qualitative), the data fields it needs, and its priority.
//!
//! ## Verdicts
//!
//! Every dispatched agent yields exactly one [`AgentResult`] with a
//! tri-state `passed`: pass, fail, or inconclusive.
//!
//! ## Aggregation
//!
//! [`summarize`] folds all results into a [`ComplianceSummary`] with an
//! [`OverallStatus`], a [`Decision`], and prioritized recommendations.

pub mod agent;
pub mod assessment;
pub mod compliance;
pub mod config;
pub mod core;
pub mod document;
pub mod prompt;
pub mod requirement;
pub mod rule;
pub mod util;

// Re-export commonly used types
pub use agent::{
    catalog::{AgentCatalog, CatalogOverview, CatalogValidation},
    result::AgentResult,
    spec::{
        AgentSpec, ArchetypeParams, CriteriaParams, QualitativeParams, ScoreParams, ThresholdParams,
    },
    value_objects::{
        Archetype, Complexity, EvaluatorKind, Origin, PolicyDomain, Priority, ThresholdType,
    },
    verdict::{ReasonedVerdict, parse_verdict},
};
pub use assessment::extracted_data::{ExtractedData, FieldValue};
pub use compliance::{
    status::{Decision, OverallStatus},
    summary::{ComplianceSummary, DEFAULT_MAX_RECOMMENDATIONS, Statistics, summarize},
};
pub use config::OutputFormat;
pub use core::{
    error::{ChunkingError, ValidationError},
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use document::{
    chunker::{Chunker, DEFAULT_MAX_TOKENS},
    entities::{BlockKind, DocumentChunk, NormalizedDocument, SourceSpan, TextBlock},
};
pub use prompt::{EvaluatorPromptTemplate, OutputSchema, PromptTemplate};
pub use requirement::{
    candidate::RawCandidate,
    classifier::{RejectedCandidate, classify, classify_all},
};
pub use rule::{AuthoritativeRule, LinkedRule};
