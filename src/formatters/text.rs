//! Key-value text formatter
//!
//! Renders `name="value"` pairs separated by single spaces: macro table
//! entries first, then the event or message, then record fields.
//!
//! Example: `time="2025-01-08T10:30:45.123Z" level="WARN" event="login" user="alice"`

use super::{Formatter, Layout};
use crate::core::{FieldValue, LogRecord, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;
use std::fmt::Write as _;

#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    layout: Layout,
    use_colors: bool,
}

impl TextFormatter {
    /// Formatter with an empty macro table
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter rendering `time`, `level` and `logger` ahead of the fields
    ///
    /// # Example
    ///
    /// ```
    /// use rust_log_hierarchy::core::{LogLevel, LogRecord};
    /// use rust_log_hierarchy::formatters::{Formatter, TextFormatter};
    ///
    /// let record = LogRecord::new(LogLevel::Warn, "app").with_message("disk low");
    /// let line = TextFormatter::standard().format(&record).unwrap();
    /// assert!(line.contains(r#"level="WARN" logger="app" message="disk low""#));
    /// ```
    pub fn standard() -> Self {
        Self::new()
            .add_macro("time", "asctime")
            .add_macro("level", "levelname")
            .add_macro("logger", "name")
    }

    /// Render the value of macro `key` under `display` ahead of the fields
    #[must_use]
    pub fn add_macro(mut self, display: impl Into<String>, key: impl Into<String>) -> Self {
        self.layout.add_macro(display, key);
        self
    }

    /// Render record field `key` as `display`
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

    /// Colorize level names (only with the `console` feature)
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn push_pair(out: &mut String, name: &str, value: &str) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value);
        out.push('"');
    }

    fn render_macro(&self, record: &LogRecord, key: &str) -> String {
        let value = self.layout.macro_value(record, key).to_string();
        if self.use_colors && key == "levelname" {
            return paint_level(record, value);
        }
        value
    }
}

#[cfg(feature = "console")]
fn paint_level(record: &LogRecord, value: String) -> String {
    value.color(record.level.color_code()).to_string()
}

#[cfg(not(feature = "console"))]
fn paint_level(_record: &LogRecord, value: String) -> String {
    value
}

/// Escape quotes, backslashes and control whitespace so a record stays on one line
fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:04x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut out = String::with_capacity(128);

        for (display, key) in self.layout.macros() {
            let value = self.render_macro(record, key);
            Self::push_pair(&mut out, display, &value);
        }

        for (name, value) in self.layout.record_entries(record) {
            match value {
                FieldValue::String(s) => Self::push_pair(&mut out, name, &s),
                other => Self::push_pair(&mut out, name, &other.to_string()),
            }
        }

        Ok(out)
    }

    fn name(&self) -> &str {
        "text"
    }
}
