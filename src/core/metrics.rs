//! Handler metrics for observability
//!
//! Counters describing what a handler did with the records it received.
//! Failures inside a handler never reach the caller, so these counters are
//! the place to look when output goes missing or degrades.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-handler counters
///
/// # Example
///
/// ```
/// use rust_log_hierarchy::HandlerMetrics;
///
/// let metrics = HandlerMetrics::new();
/// metrics.record_written();
/// metrics.record_filtered();
///
/// assert_eq!(metrics.written_count(), 1);
/// assert_eq!(metrics.filtered_count(), 1);
/// ```
#[derive(Debug)]
pub struct HandlerMetrics {
    /// Records written to the writer (including fallback text)
    written: AtomicU64,

    /// Records rejected by one of the handler's filters
    filtered: AtomicU64,

    /// Records whose formatting failed and were replaced by the fallback text
    format_failures: AtomicU64,

    /// Records the writer failed to accept
    write_failures: AtomicU64,
}

impl HandlerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            format_failures: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_failure_count(&self) -> u64 {
        self.format_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failure_count(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    /// Returns the previous value
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_format_failure(&self) -> u64 {
        self.format_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Records received by the handler, whatever happened to them
    pub fn received_count(&self) -> u64 {
        self.written_count() + self.filtered_count() + self.write_failure_count()
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.written.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.format_failures.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for HandlerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HandlerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            written: AtomicU64::new(self.written_count()),
            filtered: AtomicU64::new(self.filtered_count()),
            format_failures: AtomicU64::new(self.format_failure_count()),
            write_failures: AtomicU64::new(self.write_failure_count()),
        }
    }
}
