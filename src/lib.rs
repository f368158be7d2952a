//! # Rust Log Hierarchy
//!
//! A structured, hierarchical logging library. Application code obtains
//! named loggers from a registry, emits leveled messages or structured
//! events, and every record fans out to the handlers of the originating
//! logger and of all its ancestors.
//!
//! ## Features
//!
//! - **Dotted hierarchy**: `"app.db"` is a child of `"app"`, which is a child
//!   of the root `""`. Levels are inherited from the nearest ancestor that
//!   sets one.
//! - **Cheap when disabled**: the level gate runs before any record is built.
//! - **Independent handlers**: each handler filters, formats (text or JSON)
//!   and writes on its own; a broken field never reaches the caller.
//! - **Thread safe**: registries, loggers and handlers can be shared and
//!   mutated from any thread.
//!
//! ## Example
//!
//! ```
//! use rust_log_hierarchy::prelude::*;
//!
//! let registry = Registry::new();
//! let writer = MemoryWriter::new();
//! let output = writer.buffer();
//!
//! let handler = Handler::builder("app")
//!     .formatter(TextFormatter::new())
//!     .writer(writer)
//!     .build();
//! registry.get_logger("pkg").add_handler(handler);
//! registry.get_logger("pkg").set_level(LogLevel::Warn);
//!
//! let sub = registry.get_logger("pkg.sub");
//! sub.info("not shown");
//! sub.warn("disk almost full");
//!
//! assert_eq!(output.contents(), "message=\"disk almost full\"\n");
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod writers;

pub mod prelude {
    pub use crate::core::{
        get_handler, get_logger, EventBuilder, FieldValue, Fields, Filter, FnFilter, Handler,
        HandlerBuilder, LevelRangeFilter, LogLevel, LogRecord, Logger, LoggerNameFilter,
        Registry, SamplingFilter, SharedFilter,
    };
    pub use crate::formatters::{Formatter, JsonFormatter, TextFormatter};
    pub use crate::writers::{ConsoleWriter, FileWriter, MemoryWriter, Writer};
}

pub use crate::core::{
    ancestor_names, get_handler, get_logger, set_exit_hook, EventBuilder, ExitHook, FieldValue,
    Fields, Filter, FnFilter, Handler, HandlerBuilder, HandlerMetrics, LevelRangeFilter, LogLevel,
    LogRecord, Logger, LoggerConfig, LoggerError, LoggerNameFilter, ProcessExit, Registry,
    RegistryConfig, Result, SamplingFilter, SharedFilter, TimestampFormat, DEFAULT_LEVEL,
};
pub use formatters::{Formatter, JsonFormatter, TextFormatter, FORMAT_ERROR_MESSAGE};
pub use writers::{AsyncWriter, ConsoleWriter, FileWriter, MemoryBuffer, MemoryWriter, Writer};
