//! Progress display for pipeline runs

pub mod reporter;
