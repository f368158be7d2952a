//! Named loggers
//!
//! A `Logger` is one node of the dot-separated hierarchy kept by a
//! [`Registry`](super::registry::Registry). It never stores a pointer to its
//! parent: ancestors are found by name through the registry on every lookup,
//! so the hierarchy cannot contain cycles and loggers created later slot in
//! automatically.

use super::{
    field::{FieldValue, Fields},
    filter::{same_filter, SharedFilter},
    handler::{panic_message, Handler},
    log_level::{LogLevel, DEFAULT_LEVEL},
    record::{LogRecord, STACK_KEY},
    registry::RegistryInner,
};
use parking_lot::RwLock;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Exit code passed to the exit hook after a fatal record
pub const FATAL_EXIT_CODE: i32 = 1;

/// Names of the ancestors of `name`, nearest first, ending with the root `""`.
///
/// ```
/// use rust_log_hierarchy::core::ancestor_names;
///
/// let chain: Vec<&str> = ancestor_names("a.b.c").collect();
/// assert_eq!(chain, vec!["a.b", "a", ""]);
/// assert_eq!(ancestor_names("").count(), 0);
/// ```
pub fn ancestor_names(name: &str) -> impl Iterator<Item = &str> {
    let mut current = Some(name);
    std::iter::from_fn(move || {
        let name = current?;
        if name.is_empty() {
            current = None;
            return None;
        }
        let parent = name.rfind('.').map_or("", |idx| &name[..idx]);
        current = Some(parent);
        Some(parent)
    })
}

pub struct Logger {
    name: String,
    registry: Weak<RegistryInner>,
    level: RwLock<Option<LogLevel>>,
    propagate: AtomicBool,
    handlers: RwLock<Vec<Arc<Handler>>>,
    filters: RwLock<Vec<SharedFilter>>,
    fields: RwLock<Fields>,
    extra_macros: RwLock<Fields>,
}

impl Logger {
    pub(crate) fn new(name: impl Into<String>, registry: Weak<RegistryInner>) -> Self {
        Self {
            name: name.into(),
            registry,
            level: RwLock::new(None),
            propagate: AtomicBool::new(true),
            handlers: RwLock::new(Vec::new()),
            filters: RwLock::new(Vec::new()),
            fields: RwLock::new(Fields::new()),
            extra_macros: RwLock::new(Fields::new()),
        }
    }

    /// Full dotted name; the root logger's name is empty
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    // ---- level ----------------------------------------------------------

    /// Set an explicit level. `LogLevel::NotLog` silences this logger.
    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = Some(level);
    }

    /// Drop the explicit level so the logger inherits from its ancestors
    pub fn clear_level(&self) {
        *self.level.write() = None;
    }

    /// The explicit level of this logger, if any
    pub fn level(&self) -> Option<LogLevel> {
        *self.level.read()
    }

    /// Nearest explicit level walking from this logger to the root, or
    /// `DEFAULT_LEVEL` when the whole chain is unset.
    pub fn effective_level(&self) -> LogLevel {
        if let Some(level) = self.level() {
            return level;
        }
        let Some(registry) = self.registry.upgrade() else {
            return DEFAULT_LEVEL;
        };
        let loggers = registry.loggers.read();
        ancestor_names(&self.name)
            .filter_map(|name| loggers.get(name))
            .find_map(|logger| logger.level())
            .unwrap_or(DEFAULT_LEVEL)
    }

    /// The level gate: `level` must reach the effective level and be a real level
    #[inline]
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level.is_loggable() && level >= self.effective_level()
    }

    // ---- hierarchy ------------------------------------------------------

    /// Nearest existing ancestor (the root for top-level loggers)
    pub fn parent(&self) -> Option<Arc<Logger>> {
        let registry = self.registry.upgrade()?;
        let loggers = registry.loggers.read();
        ancestor_names(&self.name).find_map(|name| loggers.get(name).cloned())
    }

    /// Whether records continue to ancestor handlers after this logger's own.
    /// Defaults to `true`.
    pub fn set_propagate(&self, propagate: bool) {
        self.propagate.store(propagate, Ordering::Release);
    }

    pub fn propagates(&self) -> bool {
        self.propagate.load(Ordering::Acquire)
    }

    // ---- handlers, filters, fields --------------------------------------

    pub fn add_handler(&self, handler: Arc<Handler>) {
        self.handlers.write().push(handler);
    }

    /// Detach every occurrence of `handler`. The handler itself lives on
    /// wherever else it is referenced.
    pub fn remove_handler(&self, handler: &Arc<Handler>) {
        self.handlers.write().retain(|h| !Arc::ptr_eq(h, handler));
    }

    /// Snapshot of the attached handlers
    pub fn handlers(&self) -> Vec<Arc<Handler>> {
        self.handlers.read().clone()
    }

    pub fn add_filter(&self, filter: SharedFilter) {
        self.filters.write().push(filter);
    }

    pub fn remove_filter(&self, filter: &SharedFilter) {
        self.filters.write().retain(|f| !same_filter(f, filter));
    }

    /// Snapshot of the attached filters
    pub fn filters(&self) -> Vec<SharedFilter> {
        self.filters.read().clone()
    }

    /// Append `key=value` to every record this logger emits from now on
    pub fn add_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.write().push(key, value);
    }

    /// Append `key=value` to every later record, after the logger's fields,
    /// and make it available to formatter macro tables under any display name.
    pub fn add_extra_macro(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.extra_macros.write().push(key, value);
    }

    pub fn fields(&self) -> Fields {
        self.fields.read().clone()
    }

    pub fn extra_macros(&self) -> Fields {
        self.extra_macros.read().clone()
    }

    // ---- logging --------------------------------------------------------

    /// Log a free-text message at `level`
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_message(level, message);
    }

    /// Log preformatted arguments at `level`; nothing is formatted when the
    /// level is disabled.
    pub fn logf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.log_args(level, args);
    }

    /// Returns whether the level gate let the record through
    fn log_message(&self, level: LogLevel, message: impl Into<String>) -> bool {
        if !self.is_enabled_for(level) {
            return false;
        }
        self.emit(LogRecord::new(level, self.name.as_str()).with_message(message), Fields::new());
        true
    }

    fn log_args(&self, level: LogLevel, args: fmt::Arguments<'_>) -> bool {
        if !self.is_enabled_for(level) {
            return false;
        }
        let message = match args.as_str() {
            Some(s) => s.to_string(),
            None => fmt::format(args),
        };
        self.emit(LogRecord::new(level, self.name.as_str()).with_message(message), Fields::new());
        true
    }

    /// Start a structured event named `name`
    pub fn event(&self, name: impl Into<String>) -> EventBuilder<'_> {
        EventBuilder::new(self, name)
    }

    /// Capture the current call stack and emit it at `level`
    #[inline(never)]
    pub fn stack(&self, level: LogLevel) {
        if !self.is_enabled_for(level) {
            return;
        }
        let trace = std::backtrace::Backtrace::force_capture().to_string();
        let record = LogRecord::new(level, self.name.as_str()).with_event(STACK_KEY);
        self.emit(record, Fields::new().with_field(STACK_KEY, trace));
    }

    /// Merge logger fields and extra macros, run logger filters, then
    /// dispatch to this logger's handlers and its ancestors' handlers.
    fn emit(&self, mut record: LogRecord, explicit: Fields) {
        let macros = self.extra_macros();
        let mut fields = explicit;
        fields.extend_from(&self.fields.read());
        fields.extend_from(&macros);
        record.fields = fields;
        record.macros = macros;

        if !self.passes_filters(&record) {
            return;
        }

        for handler in self.handlers() {
            handler.handle(&record);
        }

        if !self.propagates() {
            return;
        }
        for ancestor in self.ancestors() {
            for handler in ancestor.handlers() {
                handler.handle(&record);
            }
            if !ancestor.propagates() {
                break;
            }
        }
    }

    fn passes_filters(&self, record: &LogRecord) -> bool {
        let filters = self.filters.read();
        let verdict = catch_unwind(AssertUnwindSafe(|| {
            filters.iter().all(|f| f.filter(record))
        }));
        match verdict {
            Ok(pass) => pass,
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Logger '{}' filter panicked: {}. Record dropped.",
                    self.name,
                    panic_message(panic_info.as_ref())
                );
                false
            }
        }
    }

    /// Existing ancestors, nearest first
    fn ancestors(&self) -> Vec<Arc<Logger>> {
        let Some(registry) = self.registry.upgrade() else {
            return Vec::new();
        };
        let loggers = registry.loggers.read();
        ancestor_names(&self.name)
            .filter_map(|name| loggers.get(name).cloned())
            .collect()
    }

    fn exit_after_fatal(&self) {
        match self.registry.upgrade() {
            Some(registry) => registry.exit(FATAL_EXIT_CODE),
            None => std::process::exit(FATAL_EXIT_CODE),
        }
    }
}

macro_rules! leveled_methods {
    ($(($plain:ident, $formatted:ident, $level:expr)),* $(,)?) => {
        impl Logger {
            $(
                #[inline]
                pub fn $plain(&self, message: impl Into<String>) {
                    self.log($level, message);
                }

                #[inline]
                pub fn $formatted(&self, args: fmt::Arguments<'_>) {
                    self.logf($level, args);
                }
            )*
        }
    };
}

leveled_methods!(
    (debug, debugf, LogLevel::Debug),
    (info, infof, LogLevel::Info),
    (warn, warnf, LogLevel::Warn),
    (warning, warningf, LogLevel::Warn),
    (error, errorf, LogLevel::Error),
    (critical, criticalf, LogLevel::Critical),
);

impl Logger {
    /// Log at `Fatal`, then hand control to the registry's exit hook.
    ///
    /// The hook runs after every handler has seen the record. A logger whose
    /// effective level disables `Fatal` does nothing at all.
    pub fn fatal(&self, message: impl Into<String>) {
        if self.log_message(LogLevel::Fatal, message) {
            self.exit_after_fatal();
        }
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        if self.log_args(LogLevel::Fatal, args) {
            self.exit_after_fatal();
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("propagate", &self.propagates())
            .field("handlers", &self.handlers.read().len())
            .field("filters", &self.filters.read().len())
            .finish()
    }
}

/// Builder for structured events
///
/// Fields are collected eagerly; nothing is emitted until a terminal level
/// method runs, and that call applies the same level gate as `Logger::log`.
///
/// # Example
///
/// ```
/// use rust_log_hierarchy::Registry;
///
/// let registry = Registry::new();
/// let logger = registry.get_logger("app.http");
///
/// logger.event("request")
///     .field("method", "GET")
///     .field("status", 200)
///     .info();
/// ```
#[must_use = "an event is only emitted by a terminal level method"]
pub struct EventBuilder<'a> {
    logger: &'a Logger,
    name: String,
    fields: Fields,
}

impl<'a> EventBuilder<'a> {
    fn new(logger: &'a Logger, name: impl Into<String>) -> Self {
        Self {
            logger,
            name: name.into(),
            fields: Fields::new(),
        }
    }

    /// Append a field; duplicate keys are kept in order
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.push(key, value);
        self
    }

    /// Append every field of `fields`
    pub fn fields(mut self, fields: &Fields) -> Self {
        self.fields.extend_from(fields);
        self
    }

    /// Emit the event at `level`
    pub fn log(self, level: LogLevel) {
        self.emit(level);
    }

    fn emit(self, level: LogLevel) -> bool {
        if !self.logger.is_enabled_for(level) {
            return false;
        }
        let record = LogRecord::new(level, self.logger.name()).with_event(self.name);
        self.logger.emit(record, self.fields);
        true
    }

    pub fn debug(self) {
        self.log(LogLevel::Debug);
    }

    pub fn info(self) {
        self.log(LogLevel::Info);
    }

    pub fn warn(self) {
        self.log(LogLevel::Warn);
    }

    pub fn warning(self) {
        self.log(LogLevel::Warn);
    }

    pub fn error(self) {
        self.log(LogLevel::Error);
    }

    pub fn critical(self) {
        self.log(LogLevel::Critical);
    }

    /// Emit at `Fatal`, then run the exit hook if the event was enabled
    pub fn fatal(self) {
        let logger = self.logger;
        if self.emit(LogLevel::Fatal) {
            logger.exit_after_fatal();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FnFilter, LoggerNameFilter, Registry};
    use crate::formatters::TextFormatter;
    use crate::writers::{MemoryBuffer, MemoryWriter};
    use std::sync::atomic::AtomicUsize;

    fn memory_handler(name: &str) -> (Arc<Handler>, MemoryBuffer) {
        let writer = MemoryWriter::new();
        let buffer = writer.buffer();
        let handler = Handler::builder(name)
            .formatter(TextFormatter::new())
            .writer(writer)
            .build();
        (handler, buffer)
    }

    #[test]
    fn test_ancestor_names() {
        assert_eq!(ancestor_names("a").collect::<Vec<_>>(), vec![""]);
        assert_eq!(
            ancestor_names("pkg.sub.leaf").collect::<Vec<_>>(),
            vec!["pkg.sub", "pkg", ""]
        );
    }

    #[test]
    fn test_effective_level_walks_ancestors() {
        let registry = Registry::new();
        let pkg = registry.get_logger("pkg");
        let leaf = registry.get_logger("pkg.sub.leaf");

        assert_eq!(leaf.effective_level(), DEFAULT_LEVEL);

        pkg.set_level(LogLevel::Error);
        assert_eq!(leaf.effective_level(), LogLevel::Error);

        // An intermediate logger created later takes precedence once it has a level
        let sub = registry.get_logger("pkg.sub");
        sub.set_level(LogLevel::Debug);
        assert_eq!(leaf.effective_level(), LogLevel::Debug);

        sub.clear_level();
        assert_eq!(leaf.effective_level(), LogLevel::Error);
    }

    #[test]
    fn test_notlog_stops_the_walk_for_descendants_without_level() {
        let registry = Registry::new();
        let parent = registry.get_logger("svc");
        let child = registry.get_logger("svc.worker");
        parent.set_level(LogLevel::NotLog);

        assert!(!child.is_enabled_for(LogLevel::Fatal));

        child.set_level(LogLevel::Info);
        assert!(child.is_enabled_for(LogLevel::Info));
        assert!(!parent.is_enabled_for(LogLevel::Fatal));
    }

    #[test]
    fn test_parent_is_nearest_existing_ancestor() {
        let registry = Registry::new();
        let leaf = registry.get_logger("a.b.c");
        assert!(leaf.parent().unwrap().is_root());

        let a = registry.get_logger("a");
        assert!(Arc::ptr_eq(&leaf.parent().unwrap(), &a));
        assert!(registry.root().parent().is_none());
    }

    #[test]
    fn test_fields_merge_after_event_fields() {
        let registry = Registry::new();
        let logger = registry.get_logger("app");
        let (handler, buffer) = memory_handler("mem");
        logger.add_handler(handler);
        logger.set_level(LogLevel::Debug);

        logger.add_field("custom", "x");
        logger.event("test").field("custom", "y").field("n", 1).info();

        assert_eq!(
            buffer.contents(),
            "event=\"test\" custom=\"y\" n=\"1\" custom=\"x\"\n"
        );
    }

    #[test]
    fn test_extra_macros_follow_fields() {
        let registry = Registry::new();
        let logger = registry.get_logger("app");
        let (handler, buffer) = memory_handler("mem");
        logger.add_handler(handler.clone());

        logger.add_extra_macro("region", "eu");
        logger.add_field("service", "api");
        handler.set_formatter(TextFormatter::new().add_macro("zone", "region"));
        logger.event("boot").warn();

        assert_eq!(
            buffer.contents(),
            "zone=\"eu\" event=\"boot\" service=\"api\" region=\"eu\"\n"
        );
    }

    #[test]
    fn test_propagation_stops_at_non_propagating_logger() {
        let registry = Registry::new();
        let (root_handler, root_out) = memory_handler("root");
        let (mid_handler, mid_out) = memory_handler("mid");
        registry.root().add_handler(root_handler);
        registry.root().set_level(LogLevel::Debug);

        let mid = registry.get_logger("a");
        mid.add_handler(mid_handler);
        mid.set_propagate(false);

        registry.get_logger("a.b").info("hello");

        assert!(mid_out.contains("hello"));
        assert!(root_out.is_empty());
    }

    #[test]
    fn test_logger_filter_blocks_before_dispatch() {
        let registry = Registry::new();
        let (handler, out) = memory_handler("root");
        let root = registry.root();
        root.add_handler(handler);
        root.set_level(LogLevel::Debug);

        let logger = registry.get_logger("app.noisy");
        let filter: SharedFilter = Arc::new(LoggerNameFilter::new("app.quiet"));
        logger.add_filter(filter.clone());
        logger.warn("dropped");
        assert!(out.is_empty());

        logger.remove_filter(&filter);
        logger.warn("kept");
        assert!(out.contains("kept"));
    }

    #[test]
    fn test_fatal_runs_exit_hook_after_dispatch() {
        let registry = Registry::new();
        let (handler, out) = memory_handler("root");
        registry.root().add_handler(handler);

        let exits = Arc::new(AtomicUsize::new(0));
        let seen_output = Arc::new(AtomicBool::new(false));
        {
            let exits = Arc::clone(&exits);
            let seen_output = Arc::clone(&seen_output);
            let out = out.clone();
            registry.set_exit_hook(move |code: i32| {
                assert_eq!(code, FATAL_EXIT_CODE);
                seen_output.store(out.contains("shutting down"), Ordering::SeqCst);
                exits.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.get_logger("app").fatal("shutting down");

        assert_eq!(exits.load(Ordering::SeqCst), 1);
        assert!(seen_output.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stack_contains_backtrace() {
        let registry = Registry::new();
        let (handler, out) = memory_handler("root");
        let logger = registry.get_logger("trace");
        logger.add_handler(handler);
        logger.set_level(LogLevel::Debug);

        logger.stack(LogLevel::Debug);

        let line = out.contents();
        assert!(line.starts_with("event=\"stack\" stack=\""));
        assert!(line.contains("Logger::stack"));
        assert_eq!(out.lines().len(), 1);
    }

    #[test]
    fn test_disabled_fatal_does_not_exit() {
        let registry = Registry::new();
        let (handler, out) = memory_handler("root");
        registry.root().add_handler(handler);

        let exits = Arc::new(AtomicUsize::new(0));
        {
            let exits = Arc::clone(&exits);
            registry.set_exit_hook(move |_code: i32| {
                exits.fetch_add(1, Ordering::SeqCst);
            });
        }

        let logger = registry.get_logger("quiet");
        logger.set_level(LogLevel::NotLog);
        logger.fatal("silenced");
        logger.fatalf(format_args!("silenced {}", 2));
        logger.event("halt").fatal();

        assert_eq!(exits.load(Ordering::SeqCst), 0);
        assert!(out.is_empty());

        logger.set_level(LogLevel::Fatal);
        logger.event("halt").fatal();
        assert_eq!(exits.load(Ordering::SeqCst), 1);
        assert_eq!(out.lines(), vec!["event=\"halt\""]);
    }

    #[test]
    fn test_logger_filter_panic_is_contained() {
        let registry = Registry::new();
        let (handler, out) = memory_handler("root");
        registry.root().add_handler(handler);

        let logger = registry.get_logger("app.fragile");
        let panicking: SharedFilter = Arc::new(FnFilter::new(|_record: &LogRecord| -> bool {
            panic!("filter bug")
        }));
        logger.add_filter(panicking.clone());

        let result = std::panic::catch_unwind(AssertUnwindSafe(|| logger.error("dropped")));
        assert!(result.is_ok());
        assert!(out.is_empty());

        logger.remove_filter(&panicking);
        logger.error("kept");
        assert!(out.contains("kept"));
    }

    #[test]
    fn test_logf_skips_formatting_when_disabled() {
        struct Loud<'a>(&'a AtomicUsize);
        impl fmt::Display for Loud<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fetch_add(1, Ordering::SeqCst);
                f.write_str("loud")
            }
        }

        let registry = Registry::new();
        let logger = registry.get_logger("lazy");
        let calls = AtomicUsize::new(0);

        logger.set_level(LogLevel::Error);
        logger.infof(format_args!("{}", Loud(&calls)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        logger.errorf(format_args!("{}", Loud(&calls)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
