//! C5 — the structured business event log.
//!
//! One JSON object per line, written under a single mutex so records from
//! the reader thread (C3) and the main/ticker threads (C4) never interleave
//! (spec §4.5, §5). This is a distinct concern from `tracing` diagnostics:
//! every line here is a contractual record an operator or test can replay,
//! not a human-facing log line — see SPEC_FULL.md §2.

use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

/// A process-scoped logger object, passed explicitly to C3 and C4 rather
/// than reached through a global mutex (Design Note §9).
pub struct EventLog {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl EventLog {
    /// Wrap any writer (a file, stdout, or an in-memory buffer in tests).
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Emit a tagged record with the given `event` name and freeform
    /// key/value payload, serialized as a single JSON line.
    pub fn emit(&self, event: &str, fields: impl Serialize) {
        let mut record = match serde_json::to_value(fields) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                let mut map = Map::new();
                map.insert("value".to_owned(), other);
                map
            }
            Err(_) => Map::new(),
        };
        record.insert("event".to_owned(), Value::String(event.to_owned()));
        record
            .entry("ts")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        let line = Value::Object(record).to_string();
        let mut guard = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(guard, "{line}");
    }
}
