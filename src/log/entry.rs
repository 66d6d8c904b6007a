//! The JSON record shape for line-delimited log output.
//!
//! Each entry is a self-contained JSON object, one per line, so output
//! piped to a file or a collector stays parseable no matter where the
//! stream is cut.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single structured log record.
///
/// Additional key/value fields supplied by the caller (and any ambient
/// fields bound on enclosing spans) are flattened into the top-level
/// object alongside the fixed keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO 8601 timestamp with local offset (e.g., "2026-08-29T14:30:45.123+02:00")
    pub timestamp: String,

    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Logger name the event was emitted under
    pub logger: String,

    /// Human-readable message
    pub event: String,

    /// Source file of the emitting callsite, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Source line of the emitting callsite, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Enclosing span scope, root first (e.g., "request > retry")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,

    /// Caller-supplied structured fields, flattened into the object
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogEntry {
    /// Create a new entry stamped with the current local time.
    pub fn new(
        level: impl Into<String>,
        logger: impl Into<String>,
        event: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false),
            level: level.into(),
            logger: logger.into(),
            event: event.into(),
            file: None,
            line: None,
            span: None,
            fields: Map::new(),
        }
    }

    /// Attach the emitting callsite.
    pub fn with_callsite(mut self, file: Option<&str>, line: Option<u32>) -> Self {
        self.file = file.map(str::to_owned);
        self.line = line;
        self
    }

    /// Attach the enclosing span scope.
    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }

    /// Attach structured fields.
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
