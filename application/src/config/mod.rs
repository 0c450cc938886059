//! Application-level configuration.
//!
//! - [`PipelineConfig`] - chunking, concurrency, timeouts, evaluator registry
//! - [`RetryPolicy`] - exponential backoff for transient reasoning failures

pub mod pipeline;
pub mod retry;

pub use pipeline::{PipelineConfig, default_concurrency_limit};
pub use retry::RetryPolicy;
