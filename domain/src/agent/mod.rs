//! Compliance agents: specs, verdicts, and catalogs.

pub mod catalog;
pub mod result;
pub mod spec;
pub mod value_objects;
pub mod verdict;
