//! Prompt domain
//!
//! Templates and output schemas for every reasoning call in the pipeline.

pub mod evaluator;
pub mod schema;
mod template;

pub use evaluator::EvaluatorPromptTemplate;
pub use schema::OutputSchema;
pub use template::PromptTemplate;
