//! Port for structured run logging.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port records pipeline events
//! (chunk extraction, rejected candidates, agent verdicts) in a
//! machine-readable format (JSONL).

use serde_json::Value;

/// A structured run event.
pub struct RunEvent {
    /// Event type identifier (e.g., "chunk_extracted", "agent_evaluated").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RunEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging run events.
///
/// `log` is synchronous and non-fallible; logging failures are ignored.
pub trait RunLogger: Send + Sync {
    fn log(&self, event: RunEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRunLogger;

impl RunLogger for NoRunLogger {
    fn log(&self, _event: RunEvent) {}
}
