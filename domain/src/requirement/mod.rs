//! Requirement candidates and their classification into agent specs.

pub mod candidate;
pub mod classifier;
pub mod keywords;
pub mod threshold;
