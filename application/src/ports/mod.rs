//! Ports (interfaces) for external dependencies
//!
//! These traits define how the application layer interacts with
//! external systems. Implementations live in the infrastructure layer.

pub mod document_parser;
pub mod progress;
pub mod reasoning_service;
pub mod rule_graph;
pub mod run_logger;
