//! Compliance aggregation: statistics, overall status, recommendations.

pub mod status;
pub mod summary;
