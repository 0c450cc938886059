//! Use cases (application services)

pub mod build_catalog;
pub mod extract_data;
pub mod extract_requirements;
pub mod orchestrator;
pub mod run_compliance;
