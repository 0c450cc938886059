//! Logging infrastructure: structured run logging.
//!
//! Provides [`JsonlRunLogger`], a JSONL file writer that implements
//! the [`RunLogger`](policy_application::RunLogger) port.

mod run_logger;

pub use run_logger::JsonlRunLogger;
