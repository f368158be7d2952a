//! Handlers: filter, format and write one record
//!
//! A handler is shared (`Arc<Handler>`) between any number of loggers. It
//! owns one formatter, an ordered filter list and one writer, each guarded
//! independently so call sites on different loggers can use it concurrently.

use super::{
    filter::{same_filter, Filter, SharedFilter},
    metrics::HandlerMetrics,
    record::LogRecord,
    writer::Writer,
};
use crate::formatters::{Formatter, TextFormatter, FORMAT_ERROR_MESSAGE};
use crate::writers::ConsoleWriter;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub struct Handler {
    name: String,
    formatter: RwLock<Arc<dyn Formatter>>,
    filters: RwLock<Vec<SharedFilter>>,
    writer: Mutex<Box<dyn Writer>>,
    metrics: HandlerMetrics,
}

impl Handler {
    pub fn new<F, W>(name: impl Into<String>, formatter: F, writer: W) -> Self
    where
        F: Formatter + 'static,
        W: Writer + 'static,
    {
        Self {
            name: name.into(),
            formatter: RwLock::new(Arc::new(formatter)),
            filters: RwLock::new(Vec::new()),
            writer: Mutex::new(Box::new(writer)),
            metrics: HandlerMetrics::new(),
        }
    }

    /// Start a builder with the standard text formatter and stdout writer
    #[must_use]
    pub fn builder(name: impl Into<String>) -> HandlerBuilder {
        HandlerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_formatter<F: Formatter + 'static>(&self, formatter: F) {
        *self.formatter.write() = Arc::new(formatter);
    }

    pub fn formatter(&self) -> Arc<dyn Formatter> {
        self.formatter.read().clone()
    }

    pub fn set_writer<W: Writer + 'static>(&self, writer: W) {
        let mut current = self.writer.lock();
        if let Err(e) = current.flush() {
            eprintln!(
                "[LOGGER ERROR] Handler '{}' failed to flush replaced writer '{}': {}",
                self.name,
                current.name(),
                e
            );
        }
        *current = Box::new(writer);
    }

    pub fn add_filter(&self, filter: SharedFilter) {
        self.filters.write().push(filter);
    }

    /// Remove every occurrence of `filter` (pointer identity)
    pub fn remove_filter(&self, filter: &SharedFilter) {
        self.filters.write().retain(|f| !same_filter(f, filter));
    }

    /// Snapshot of the current filter list
    pub fn filters(&self) -> Vec<SharedFilter> {
        self.filters.read().clone()
    }

    pub fn metrics(&self) -> &HandlerMetrics {
        &self.metrics
    }

    pub fn flush(&self) {
        let mut writer = self.writer.lock();
        if let Err(e) = writer.flush() {
            eprintln!(
                "[LOGGER ERROR] Handler '{}' failed to flush writer '{}': {}",
                self.name,
                writer.name(),
                e
            );
        }
    }

    /// Run filters, format and write `record`.
    ///
    /// Never fails and never panics: a formatter failure is replaced by
    /// `FORMAT_ERROR_MESSAGE`, a writer failure is reported on stderr and
    /// counted in `metrics()`.
    pub fn handle(&self, record: &LogRecord) {
        if !self.accepts(record) {
            self.metrics.record_filtered();
            return;
        }

        let mut line = self.format_or_fallback(record);
        line.push('\n');
        self.write_line(line.as_bytes());
    }

    fn accepts(&self, record: &LogRecord) -> bool {
        let filters = self.filters.read();
        let verdict = catch_unwind(AssertUnwindSafe(|| {
            filters.iter().all(|f| f.filter(record))
        }));
        match verdict {
            Ok(pass) => pass,
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Handler '{}' filter panicked: {}. Record dropped.",
                    self.name,
                    panic_message(panic_info.as_ref())
                );
                false
            }
        }
    }

    fn format_or_fallback(&self, record: &LogRecord) -> String {
        let formatter = self.formatter();
        let failure = match catch_unwind(AssertUnwindSafe(|| formatter.format(record))) {
            Ok(Ok(line)) => return line,
            Ok(Err(e)) => e.to_string(),
            Err(panic_info) => format!("panic: {}", panic_message(panic_info.as_ref())),
        };

        self.metrics.record_format_failure();
        eprintln!(
            "[LOGGER ERROR] Handler '{}' could not format record '{}' from '{}' with {} formatter: {}",
            self.name,
            record.summary(),
            record.logger_name,
            formatter.name(),
            failure
        );
        FORMAT_ERROR_MESSAGE.to_string()
    }

    fn write_line(&self, bytes: &[u8]) {
        let mut writer = self.writer.lock();
        let result = catch_unwind(AssertUnwindSafe(|| writer.write(bytes)));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_written();
            }
            Ok(Err(e)) => {
                self.metrics.record_write_failure();
                eprintln!(
                    "[LOGGER ERROR] Handler '{}' writer '{}' failed: {}",
                    self.name,
                    writer.name(),
                    e
                );
            }
            Err(panic_info) => {
                self.metrics.record_write_failure();
                eprintln!(
                    "[LOGGER CRITICAL] Handler '{}' writer panicked: {}. \
                     Other handlers continue to function.",
                    self.name,
                    panic_message(panic_info.as_ref())
                );
            }
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("formatter", &self.formatter.read().name())
            .field("filters", &self.filters.read().len())
            .finish()
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for `Handler`
///
/// # Example
///
/// ```
/// use rust_log_hierarchy::core::{Handler, LoggerNameFilter};
/// use rust_log_hierarchy::formatters::JsonFormatter;
/// use rust_log_hierarchy::writers::MemoryWriter;
///
/// let handler = Handler::builder("audit")
///     .formatter(JsonFormatter::standard())
///     .filter(LoggerNameFilter::new("app.audit"))
///     .writer(MemoryWriter::new())
///     .build();
/// assert_eq!(handler.filters().len(), 1);
/// ```
pub struct HandlerBuilder {
    name: String,
    formatter: Option<Arc<dyn Formatter>>,
    filters: Vec<SharedFilter>,
    writer: Option<Box<dyn Writer>>,
}

impl HandlerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formatter: None,
            filters: Vec::new(),
            writer: None,
        }
    }

    #[must_use]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use]
    pub fn filter<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    #[must_use]
    pub fn shared_filter(mut self, filter: SharedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn writer<W: Writer + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn build(self) -> Arc<Handler> {
        let formatter = self
            .formatter
            .unwrap_or_else(|| Arc::new(TextFormatter::standard()));
        let writer = self
            .writer
            .unwrap_or_else(|| Box::new(ConsoleWriter::stdout()));

        Arc::new(Handler {
            name: self.name,
            formatter: RwLock::new(formatter),
            filters: RwLock::new(self.filters),
            writer: Mutex::new(writer),
            metrics: HandlerMetrics::new(),
        })
    }
}
