//! Log record structure
//!
//! A `LogRecord` is built once per enabled log call, handed to every matching
//! handler, and then dropped.

use super::field::{FieldValue, Fields};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Utc};
use std::cell::RefCell;

// Thread-local cache for the thread label to avoid repeated allocations
thread_local! {
    static THREAD_LABEL_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Name of the current thread, or its id when unnamed
fn current_thread_label() -> String {
    THREAD_LABEL_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let thread = std::thread::current();
                thread
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{:?}", thread.id()))
            })
            .clone()
    })
}

/// Field key holding the free-text message of a record.
pub const MESSAGE_KEY: &str = "message";
/// Field key holding the event name of a structured record.
pub const EVENT_KEY: &str = "event";
/// Field key holding captured stack text.
pub const STACK_KEY: &str = "stack";

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub logger_name: String,
    pub message: Option<String>,
    pub event: Option<String>,
    /// Explicit fields, then the emitting logger's fields and extra macros.
    pub fields: Fields,
    /// Extra macro values supplied by the emitting logger.
    pub macros: Fields,
    pub thread: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, logger_name: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            logger_name: logger_name.into(),
            message: None,
            event: None,
            fields: Fields::new(),
            macros: Fields::new(),
            thread: current_thread_label(),
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Resolve a macro key against this record.
    ///
    /// Built-in keys are `asctime`, `created`, `levelname`, `levelno`, `name`,
    /// `message`, `event` and `thread`. Any other key is looked up in the
    /// logger-supplied extra macros.
    pub fn macro_value(&self, key: &str, timestamp_format: &TimestampFormat) -> Option<FieldValue> {
        let value = match key {
            "asctime" => {
                let stamp = timestamp_format.format(&self.timestamp);
                match stamp.parse::<i64>() {
                    Ok(n) if timestamp_format.is_numeric() => FieldValue::Int(n),
                    _ => FieldValue::String(stamp),
                }
            }
            "created" => {
                FieldValue::Float(self.timestamp.timestamp_micros() as f64 / 1_000_000.0)
            }
            "levelname" => FieldValue::String(self.level.to_str().to_string()),
            "levelno" => FieldValue::Int(self.level.value() as i64),
            "name" => FieldValue::String(self.logger_name.clone()),
            "thread" => FieldValue::String(self.thread.clone()),
            "message" => FieldValue::from(self.message.clone()),
            "event" => FieldValue::from(self.event.clone()),
            other => return self.macros.get(other).cloned(),
        };
        Some(value)
    }

    /// The message if present, otherwise the event name.
    pub fn summary(&self) -> &str {
        self.message
            .as_deref()
            .or(self.event.as_deref())
            .unwrap_or_default()
    }
}
