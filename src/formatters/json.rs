//! JSON formatter for structured logging
//!
//! Writes each record as a single-line JSON object (JSONL), compatible with
//! log aggregation tools like ELK, Loki, etc. Macro table entries come first,
//! then the event or message, then record fields. Duplicate keys are kept in
//! order.

use super::{Formatter, Layout};
use crate::core::{LogRecord, LoggerError, Result, TimestampFormat};
use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    layout: Layout,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter emitting `time`, `level` and `logger` keys ahead of the fields
    pub fn standard() -> Self {
        Self::new()
            .add_macro("time", "asctime")
            .add_macro("level", "levelname")
            .add_macro("logger", "name")
    }

    #[must_use]
    pub fn add_macro(mut self, display: impl Into<String>, key: impl Into<String>) -> Self {
        self.layout.add_macro(display, key);
        self
    }

    #[must_use]
    pub fn rename_field(mut self, key: impl Into<String>, display: impl Into<String>) -> Self {
        self.layout.rename_field(key, display);
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.layout.set_timestamp_format(format);
        self
    }
}

/// Borrowed view serializing a record through a layout
struct RecordView<'a> {
    layout: &'a Layout,
    record: &'a LogRecord,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (display, key) in self.layout.macros() {
            map.serialize_entry(display, &self.layout.macro_value(self.record, key))?;
        }
        for (name, value) in self.layout.record_entries(self.record) {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let view = RecordView {
            layout: &self.layout,
            record,
        };
        serde_json::to_string(&view)
            .map_err(|e| LoggerError::formatter(self.name(), e.to_string()))
    }

    fn name(&self) -> &str {
        "json"
    }
}
