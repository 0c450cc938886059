//! Report and catalog output formatting

pub mod console;
