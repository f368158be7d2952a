//! Record filters
//!
//! A filter decides whether a record proceeds. Handlers run their filters in
//! declaration order and stop at the first rejection. Loggers run their own
//! filters once, before the record propagates.

use super::log_level::LogLevel;
use super::record::LogRecord;
use rand::Rng;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait implemented by all log filters.
///
/// Filters are `Send + Sync` so they can be shared across threads.
pub trait Filter: Send + Sync {
    /// Return `true` if `record` should be processed.
    fn filter(&self, record: &LogRecord) -> bool;
}

/// Shared filter handle as stored by loggers and handlers
pub type SharedFilter = Arc<dyn Filter>;

/// Identity comparison for shared filters.
pub(crate) fn same_filter(a: &SharedFilter, b: &SharedFilter) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Accepts records from one logger and its descendants.
///
/// `LoggerNameFilter::new("app.db")` accepts `app.db` and `app.db.pool`, and
/// rejects `app.dbx` and `app`. An empty name accepts everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerNameFilter {
    name: String,
}

impl LoggerNameFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Filter for LoggerNameFilter {
    fn filter(&self, record: &LogRecord) -> bool {
        if self.name.is_empty() {
            return true;
        }
        match record.logger_name.strip_prefix(self.name.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

/// Accepts records whose level lies within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRangeFilter {
    min: LogLevel,
    max: LogLevel,
}

impl LevelRangeFilter {
    pub fn new(min: LogLevel, max: LogLevel) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: LogLevel) -> Self {
        Self::new(min, LogLevel::Fatal)
    }
}

impl Filter for LevelRangeFilter {
    fn filter(&self, record: &LogRecord) -> bool {
        record.level >= self.min && record.level <= self.max
    }
}

/// Random sampling filter for high-volume handlers.
///
/// Records at one of the `always_pass` levels are never sampled out.
///
/// # Example
///
/// ```
/// use rust_log_hierarchy::core::{LogLevel, SamplingFilter};
///
/// // Keep 10% of records, but every error and above
/// let filter = SamplingFilter::new(0.1)
///     .with_always_pass(vec![LogLevel::Error, LogLevel::Critical, LogLevel::Fatal]);
/// ```
#[derive(Debug)]
pub struct SamplingFilter {
    rate: f64,
    always_pass: Vec<LogLevel>,
    sampled: AtomicU64,
    dropped: AtomicU64,
}

impl SamplingFilter {
    /// `rate` is clamped to `[0.0, 1.0]`
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            always_pass: Vec::new(),
            sampled: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_always_pass(mut self, levels: Vec<LogLevel>) -> Self {
        self.always_pass = levels;
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn sampled_count(&self) -> u64 {
        self.sampled.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Filter for SamplingFilter {
    fn filter(&self, record: &LogRecord) -> bool {
        let pass = if self.always_pass.contains(&record.level) || self.rate >= 1.0 {
            true
        } else if self.rate <= 0.0 {
            false
        } else {
            rand::thread_rng().gen::<f64>() < self.rate
        };

        if pass {
            self.sampled.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        pass
    }
}

/// Adapter turning a closure into a filter
pub struct FnFilter<F>(F);

impl<F> FnFilter<F>
where
    F: Fn(&LogRecord) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnFilter(f)
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&LogRecord) -> bool + Send + Sync,
{
    fn filter(&self, record: &LogRecord) -> bool {
        (self.0)(record)
    }
}

impl<F> fmt::Debug for FnFilter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnFilter")
    }
}
