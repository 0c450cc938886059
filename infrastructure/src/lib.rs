//! Infrastructure layer for policy-agents
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod document;
pub mod logging;
pub mod reasoning;
pub mod rule_graph;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigurationError, FileConfig, FileOutputConfig};
pub use document::TextDocumentParser;
pub use logging::JsonlRunLogger;
pub use reasoning::OpenAiReasoningService;
pub use rule_graph::FileRuleGraph;
pub use store::{JsonFileError, load_catalog, load_extracted_data, write_json};
