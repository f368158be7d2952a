//! Record formatters
//!
//! A formatter turns a `LogRecord` into one line of output. Both formatters
//! share a `Layout`: an ordered macro table rendered ahead of the record's
//! own fields, plus optional display names for field keys.

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::core::{FieldValue, LogRecord, Result, TimestampFormat};
use std::collections::HashMap;

/// Text written in place of a record that could not be formatted.
pub const FORMAT_ERROR_MESSAGE: &str = "An error occurred while formatting the message";

/// Renders a record to a single line (without the trailing newline).
///
/// Implementations must be stateless with respect to individual records so
/// one formatter can serve many handlers concurrently.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<String>;

    fn name(&self) -> &str;
}

/// Macro table and field display names shared by the formatters
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// `(display name, macro key)` in render order
    macros: Vec<(String, String)>,
    renames: HashMap<String, String>,
    timestamp_format: TimestampFormat,
}

impl Layout {
    pub fn add_macro(&mut self, display: impl Into<String>, key: impl Into<String>) {
        self.macros.push((display.into(), key.into()));
    }

    pub fn rename_field(&mut self, key: impl Into<String>, display: impl Into<String>) {
        self.renames.insert(key.into(), display.into());
    }

    pub fn set_timestamp_format(&mut self, format: TimestampFormat) {
        self.timestamp_format = format;
    }

    pub fn macros(&self) -> impl Iterator<Item = (&str, &str)> {
        self.macros.iter().map(|(d, k)| (d.as_str(), k.as_str()))
    }

    /// Display name for a record field key
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.renames.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Value of a macro entry; unknown keys render as an empty string
    pub fn macro_value(&self, record: &LogRecord, key: &str) -> FieldValue {
        record
            .macro_value(key, &self.timestamp_format)
            .unwrap_or_else(|| FieldValue::String(String::new()))
    }

    /// Record entries in render order: message or event, then fields.
    pub fn record_entries<'r>(
        &'r self,
        record: &'r LogRecord,
    ) -> impl Iterator<Item = (&'r str, FieldValue)> + 'r {
        let head = [
            record
                .event
                .as_ref()
                .map(|e| (crate::core::EVENT_KEY, FieldValue::String(e.clone()))),
            record
                .message
                .as_ref()
                .map(|m| (crate::core::MESSAGE_KEY, FieldValue::String(m.clone()))),
        ];
        head.into_iter()
            .flatten()
            .chain(record.fields.iter().map(|(k, v)| (k, v.clone())))
            .map(move |(k, v)| (self.display_name(k), v))
    }
}
