//! Logging port consumed by the validation engine.
//!
//! Logging is best-effort: adapters must not fail, and the engine guards
//! every call so a misbehaving adapter cannot change a validation result.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

/// Sink for validation diagnostics.
pub trait ValidationLogger: Send + Sync {
    fn warn(&self, message: &str, context: &Value);
    fn error(&self, message: &str, context: &Value);
}

/// Forwards to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ValidationLogger for TracingLogger {
    fn warn(&self, message: &str, context: &Value) {
        tracing::warn!(entity = %entity_of(context), %context, "{message}");
    }

    fn error(&self, message: &str, context: &Value) {
        tracing::error!(entity = %entity_of(context), %context, "{message}");
    }
}

fn entity_of(context: &Value) -> &str {
    context
        .get("entity")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl ValidationLogger for NullLogger {
    fn warn(&self, _message: &str, _context: &Value) {}
    fn error(&self, _message: &str, _context: &Value) {}
}

/// Severity of a captured log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Warn,
    Error,
}

/// A single captured log call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub context: Value,
}

/// Keeps every call in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn push(&self, level: LogLevel, message: &str, context: &Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                level,
                message: message.to_string(),
                context: context.clone(),
            });
        }
    }
}

impl ValidationLogger for MemoryLogger {
    fn warn(&self, message: &str, context: &Value) {
        self.push(LogLevel::Warn, message, context);
    }

    fn error(&self, message: &str, context: &Value) {
        self.push(LogLevel::Error, message, context);
    }
}

/// Run a logging call, swallowing any panic it raises.
pub(crate) fn guarded(call: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(call)).is_err() {
        tracing::debug!("validation logger panicked; entry dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct PanickingLogger;

    impl ValidationLogger for PanickingLogger {
        fn warn(&self, _message: &str, _context: &Value) {
            panic!("sink unavailable");
        }
        fn error(&self, _message: &str, _context: &Value) {
            panic!("sink unavailable");
        }
    }

    #[test]
    fn memory_logger_records_in_order() {
        let logger = MemoryLogger::new();
        logger.warn("first", &json!({"entity": "product"}));
        logger.error("second", &json!({}));

        let entries = logger.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(entries[0].context["entity"], json!("product"));
        assert_eq!(entries[1].message, "second");
    }

    #[test]
    fn guarded_swallows_panics() {
        let logger = PanickingLogger;
        guarded(|| logger.error("boom", &json!({})));
    }

    #[test]
    fn entity_defaults_to_unknown() {
        assert_eq!(entity_of(&json!({})), "unknown");
        assert_eq!(entity_of(&json!({"entity": "order"})), "order");
    }
}
