//! JSONL file writer for pipeline run events.
//!
//! Each [`RunEvent`] is serialized as a single JSON line with `type`,
//! `seq` and `timestamp` fields, appended to the file via a buffered writer.
//! Events from concurrent agent tasks interleave; `seq` gives write order.

use policy_application::{RunEvent, RunLogger};
use serde_json::{Value, json};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct Sink {
    writer: BufWriter<File>,
    seq: u64,
}

/// JSONL run logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex`. Flushes after every event and on `Drop`.
pub struct JsonlRunLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlRunLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create run log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create run log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: RunEvent, seq: u64) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match event.payload {
            Value::Object(mut map) => {
                map.insert("type".to_string(), Value::String(event.event_type.to_string()));
                map.insert("seq".to_string(), json!(seq));
                map.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(map)
            }
            other => json!({
                "type": event.event_type,
                "seq": seq,
                "timestamp": timestamp,
                "data": other,
            }),
        }
    }
}

impl RunLogger for JsonlRunLogger {
    fn log(&self, event: RunEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        let record = Self::record(event, sink.seq);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        if writeln!(sink.writer, "{}", line).is_ok() {
            sink.seq += 1;
        }
        let _ = sink.writer.flush();
    }
}

impl Drop for JsonlRunLogger {
    fn drop(&mut self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.writer.flush();
        }
    }
}
