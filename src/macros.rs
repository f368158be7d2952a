//! Logging macros for ergonomic log message formatting.
//!
//! These macros accept `format!`-style arguments. Arguments are only
//! formatted when the logger is enabled for the level.
//!
//! # Examples
//!
//! ```
//! use rust_log_hierarchy::prelude::*;
//! use rust_log_hierarchy::warn;
//!
//! let registry = Registry::new();
//! let logger = registry.get_logger("server");
//!
//! // Basic logging
//! warn!(logger, "Server degraded");
//!
//! // With format arguments
//! let port = 8080;
//! warn!(logger, "Port {} is already in use", port);
//! ```

/// Log a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_log_hierarchy::prelude::*;
/// # let logger = Registry::new().get_logger("app");
/// use rust_log_hierarchy::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_log_hierarchy::prelude::*;
/// # let logger = Registry::new().get_logger("app");
/// use rust_log_hierarchy::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

/// Log a fatal-level message, then run the registry's exit hook.
///
/// # Examples
///
/// ```no_run
/// # use rust_log_hierarchy::prelude::*;
/// # let logger = Registry::new().get_logger("app");
/// use rust_log_hierarchy::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Handler, LogLevel, Registry};
    use crate::formatters::TextFormatter;
    use crate::writers::MemoryWriter;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    fn capture(registry: &Registry, name: &str) -> crate::writers::MemoryBuffer {
        let writer = MemoryWriter::new();
        let buffer = writer.buffer();
        let handler = Handler::builder(name)
            .formatter(TextFormatter::new())
            .writer(writer)
            .build();
        let logger = registry.get_logger(name);
        logger.add_handler(handler);
        logger.set_level(LogLevel::Debug);
        buffer
    }

    #[test]
    fn test_level_macros() {
        let registry = Registry::new();
        let out = capture(&registry, "macros");
        let logger = registry.get_logger("macros");

        debug!(logger, "debug {}", 1);
        info!(logger, "info {}", 2);
        warn!(logger, "warn {}", 3);
        error!(logger, "error {}", 4);
        critical!(logger, "critical {}", 5);
        log!(logger, LogLevel::Info, "plain");

        assert_eq!(
            out.lines(),
            vec![
                "message=\"debug 1\"",
                "message=\"info 2\"",
                "message=\"warn 3\"",
                "message=\"error 4\"",
                "message=\"critical 5\"",
                "message=\"plain\"",
            ]
        );
    }

    #[test]
    fn test_fatal_macro_calls_exit_hook() {
        let registry = Registry::new();
        let out = capture(&registry, "fatal");
        let code = Arc::new(AtomicI32::new(0));
        let seen = Arc::clone(&code);
        registry.set_exit_hook(move |c: i32| seen.store(c, Ordering::SeqCst));

        let logger = registry.get_logger("fatal");
        fatal!(logger, "gone: {}", "disk");

        assert!(out.contains("gone: disk"));
        assert_eq!(code.load(Ordering::SeqCst), 1);
    }
}
