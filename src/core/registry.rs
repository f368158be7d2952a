//! Logger and handler registry
//!
//! The registry maps names to loggers and handlers and guarantees a single
//! instance per name, even when many threads ask for the same name at once.
//! `Registry::global()` is the process-wide instance behind [`get_logger`]
//! and [`get_handler`]; independent registries can be created with
//! `Registry::new()`, which is what tests should use.

use super::{
    config::RegistryConfig,
    error::{LoggerError, Result},
    handler::Handler,
    log_level::DEFAULT_LEVEL,
    logger::Logger,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Process-exit primitive invoked after a fatal record has been dispatched
pub trait ExitHook: Send + Sync {
    fn exit(&self, code: i32);
}

/// Default exit hook: terminates the process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl ExitHook for ProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code);
    }
}

impl<F> ExitHook for F
where
    F: Fn(i32) + Send + Sync,
{
    fn exit(&self, code: i32) {
        self(code)
    }
}

pub(crate) struct RegistryInner {
    pub(crate) loggers: RwLock<HashMap<String, Arc<Logger>>>,
    handlers: RwLock<HashMap<String, Arc<Handler>>>,
    exit_hook: RwLock<Arc<dyn ExitHook>>,
}

impl RegistryInner {
    pub(crate) fn exit(&self, code: i32) {
        let hook = self.exit_hook.read().clone();
        hook.exit(code);
    }
}

/// Cheaply cloneable handle to a logger registry
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Create an independent registry holding only a root logger at
    /// `DEFAULT_LEVEL` with no handlers.
    pub fn new() -> Self {
        let inner = Arc::new_cyclic(|weak| {
            let root = Logger::new("", weak.clone());
            root.set_level(DEFAULT_LEVEL);

            let mut loggers = HashMap::new();
            loggers.insert(String::new(), Arc::new(root));

            RegistryInner {
                loggers: RwLock::new(loggers),
                handlers: RwLock::new(HashMap::new()),
                exit_hook: RwLock::new(Arc::new(ProcessExit)),
            }
        });
        Self { inner }
    }

    /// The process-wide registry, created on first use
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Return the logger named `name`, creating it on first request.
    ///
    /// The empty name is the root logger. Repeated calls with the same name
    /// return the same instance.
    pub fn get_logger(&self, name: &str) -> Arc<Logger> {
        if let Some(logger) = self.inner.loggers.read().get(name) {
            return Arc::clone(logger);
        }

        let mut loggers = self.inner.loggers.write();
        let logger = loggers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Logger::new(name, Arc::downgrade(&self.inner))));
        Arc::clone(logger)
    }

    /// Look up an existing logger without creating it
    pub fn find_logger(&self, name: &str) -> Option<Arc<Logger>> {
        self.inner.loggers.read().get(name).cloned()
    }

    pub fn root(&self) -> Arc<Logger> {
        self.get_logger("")
    }

    /// Names of every registered logger, sorted
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Return the handler registered as `name`, creating it on first request
    /// with the standard text formatter and a stdout writer.
    ///
    /// The empty name is the canonical default handler.
    pub fn get_handler(&self, name: &str) -> Arc<Handler> {
        if let Some(handler) = self.inner.handlers.read().get(name) {
            return Arc::clone(handler);
        }

        let mut handlers = self.inner.handlers.write();
        let handler = handlers
            .entry(name.to_string())
            .or_insert_with(|| Handler::builder(name).build());
        Arc::clone(handler)
    }

    /// Register `handler` under its own name so `get_handler` returns it.
    ///
    /// Fails if a different handler already holds the name.
    pub fn register_handler(&self, handler: Arc<Handler>) -> Result<()> {
        let mut handlers = self.inner.handlers.write();
        match handlers.get(handler.name()) {
            Some(existing) if !Arc::ptr_eq(existing, &handler) => Err(LoggerError::config(
                "registry",
                format!("handler '{}' is already registered", handler.name()),
            )),
            _ => {
                handlers.insert(handler.name().to_string(), handler);
                Ok(())
            }
        }
    }

    /// Replace the process-exit primitive used after fatal records
    pub fn set_exit_hook<H: ExitHook + 'static>(&self, hook: H) {
        *self.inner.exit_hook.write() = Arc::new(hook);
    }

    /// Look up a registered handler without creating it
    pub fn find_handler(&self, name: &str) -> Option<Arc<Handler>> {
        self.inner.handlers.read().get(name).cloned()
    }

    /// Apply logger settings from a configuration.
    ///
    /// Handler names must already be registered, except `""` which is the
    /// default handler. No logger is touched when the configuration is invalid.
    pub fn apply_config(&self, config: &RegistryConfig) -> Result<()> {
        config.validate()?;

        let mut attachments = Vec::with_capacity(config.loggers.len());
        for entry in &config.loggers {
            let handlers = entry
                .handlers
                .iter()
                .map(|name| self.resolve_config_handler(&entry.name, name))
                .collect::<Result<Vec<_>>>()?;
            attachments.push(handlers);
        }

        for (entry, handlers) in config.loggers.iter().zip(attachments) {
            let logger = self.get_logger(&entry.name);
            match entry.level {
                Some(level) => logger.set_level(level),
                None if entry.name.is_empty() => logger.set_level(DEFAULT_LEVEL),
                None => logger.clear_level(),
            }
            logger.set_propagate(entry.propagate);
            for (key, value) in entry.fields.iter() {
                logger.add_field(key, value.clone());
            }
            for (key, value) in entry.extra_macros.iter() {
                logger.add_extra_macro(key, value.clone());
            }
            for handler in handlers {
                logger.add_handler(handler);
            }
        }
        Ok(())
    }

    fn resolve_config_handler(&self, logger: &str, name: &str) -> Result<Arc<Handler>> {
        if name.is_empty() {
            return Ok(self.get_handler(name));
        }
        self.find_handler(name).ok_or_else(|| {
            LoggerError::config(
                "RegistryConfig",
                format!("logger '{}' refers to unknown handler '{}'", logger, name),
            )
        })
    }

    /// Forget every logger and handler and start over with a fresh root.
    ///
    /// Loggers handed out earlier keep working but are no longer part of the
    /// hierarchy.
    pub fn reset(&self) {
        let root = Logger::new("", Arc::downgrade(&self.inner));
        root.set_level(DEFAULT_LEVEL);

        let mut loggers = self.inner.loggers.write();
        loggers.clear();
        loggers.insert(String::new(), Arc::new(root));
        drop(loggers);

        self.inner.handlers.write().clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("loggers", &self.inner.loggers.read().len())
            .field("handlers", &self.inner.handlers.read().len())
            .finish()
    }
}

/// Logger `name` from the global registry
pub fn get_logger(name: &str) -> Arc<Logger> {
    Registry::global().get_logger(name)
}

/// Handler `name` from the global registry; `""` is the default handler
pub fn get_handler(name: &str) -> Arc<Handler> {
    Registry::global().get_handler(name)
}

/// Replace the global registry's exit hook
pub fn set_exit_hook<H: ExitHook + 'static>(hook: H) {
    Registry::global().set_exit_hook(hook);
}
