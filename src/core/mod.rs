//! Core logger types and traits

pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod handler;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod registry;
pub mod timestamp;
pub mod writer;

pub use config::{LoggerConfig, RegistryConfig};
pub use error::{LoggerError, Result};
pub use field::{FieldValue, Fields};
pub use filter::{Filter, FnFilter, LevelRangeFilter, LoggerNameFilter, SamplingFilter, SharedFilter};
pub use handler::{Handler, HandlerBuilder};
pub use log_level::{LogLevel, DEFAULT_LEVEL};
pub use logger::{ancestor_names, EventBuilder, Logger, FATAL_EXIT_CODE};
pub use metrics::HandlerMetrics;
pub use record::{LogRecord, EVENT_KEY, MESSAGE_KEY, STACK_KEY};
pub use registry::{get_handler, get_logger, set_exit_hook, ExitHook, ProcessExit, Registry};
pub use timestamp::TimestampFormat;
pub use writer::Writer;
