//! Integration tests for the logger hierarchy
//!
//! These tests verify:
//! - Logger identity through the global registry
//! - Level gating, the NOTLOG sentinel and level inheritance
//! - Propagation to ancestor handlers and isolation between siblings
//! - Handler filters and the JSON formatting fallback
//! - Logger fields and extra macros
//! - Handler and filter attachment
//! - File output and log injection prevention

use rust_log_hierarchy::prelude::*;
use rust_log_hierarchy::{set_exit_hook, MemoryBuffer, RegistryConfig, FORMAT_ERROR_MESSAGE};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

static MESSAGE_COUNTER: AtomicUsize = AtomicUsize::new(0);
static EXIT_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn unique_message() -> String {
    format!("message-{}", MESSAGE_COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Run `f` with a global logger named `name` that owns one capturing handler.
///
/// Fatal calls only count exits instead of terminating the test process.
fn with_logger(name: &str, f: impl FnOnce(&Arc<Logger>, &MemoryBuffer)) {
    set_exit_hook(|_code: i32| {
        EXIT_COUNTER.fetch_add(1, Ordering::SeqCst);
    });

    let writer = MemoryWriter::new();
    let buffer = writer.buffer();
    let handler = Handler::builder(name)
        .formatter(TextFormatter::new())
        .writer(writer)
        .build();

    let logger = get_logger(name);
    logger.add_handler(handler.clone());
    f(&logger, &buffer);
    logger.remove_handler(&handler);
}

#[test]
fn test_get_logger_identity() {
    for name in ["", "foo", "foo.bar"] {
        let first = get_logger(name);
        let second = get_logger(name);
        assert!(Arc::ptr_eq(&first, &second), "logger '{}' not cached", name);
    }
}

#[test]
fn test_leveled_methods_and_notlog() {
    with_logger("test_leveled_methods_and_notlog", |logger, out| {
        type Plain = fn(&Logger, String);
        type Formatted = fn(&Logger, std::fmt::Arguments<'_>);
        let methods: [(Plain, Formatted); 7] = [
            (|l, m| l.debug(m), |l, a| l.debugf(a)),
            (|l, m| l.info(m), |l, a| l.infof(a)),
            (|l, m| l.warn(m), |l, a| l.warnf(a)),
            (|l, m| l.warning(m), |l, a| l.warningf(a)),
            (|l, m| l.error(m), |l, a| l.errorf(a)),
            (|l, m| l.critical(m), |l, a| l.criticalf(a)),
            (|l, m| l.fatal(m), |l, a| l.fatalf(a)),
        ];

        logger.set_level(LogLevel::Debug);
        let exits_before = EXIT_COUNTER.load(Ordering::SeqCst);
        for (plain, formatted) in &methods {
            out.clear();
            let msg = unique_message();
            plain(logger, msg.clone());
            assert!(out.contains(&msg));

            out.clear();
            let msg = unique_message();
            formatted(logger, format_args!("{}", msg));
            assert!(out.contains(&msg));
        }
        for level in LogLevel::RECORD_LEVELS {
            out.clear();
            let msg = unique_message();
            logger.log(level, msg.clone());
            assert!(out.contains(&msg));
        }
        // log(Fatal) does not run the exit hook
        assert_eq!(EXIT_COUNTER.load(Ordering::SeqCst), exits_before + 2);

        logger.set_level(LogLevel::NotLog);
        let exits_before = EXIT_COUNTER.load(Ordering::SeqCst);
        for (plain, formatted) in &methods {
            out.clear();
            plain(logger, unique_message());
            formatted(logger, format_args!("{}", unique_message()));
            assert!(out.is_empty());
        }
        for level in LogLevel::RECORD_LEVELS {
            logger.log(level, unique_message());
            logger.logf(level, format_args!("{}", unique_message()));
            logger.event("quiet").log(level);
            logger.stack(level);
        }
        logger.event("quiet").fatal();
        assert!(out.is_empty());
        assert_eq!(EXIT_COUNTER.load(Ordering::SeqCst), exits_before);

        logger.set_level(LogLevel::Info);
        let msg = unique_message();
        logger.info(msg.clone());
        assert!(out.contains(&msg));
    });
}

#[test]
fn test_child_inherits_ancestor_level() {
    with_logger("test_child_inherits_ancestor_level", |logger, out| {
        let child = get_logger("test_child_inherits_ancestor_level.main");
        logger.set_level(LogLevel::Info);

        let msg = unique_message();
        child.log(LogLevel::Warn, msg.clone());
        assert!(out.contains(&msg));

        let msg = unique_message();
        child.log(LogLevel::Debug, msg.clone());
        assert!(!out.contains(&msg));
    });
}

#[test]
fn test_pkg_sub_scenario() {
    with_logger("pkg", |pkg, out| {
        let sub = get_logger("pkg.sub");
        pkg.set_level(LogLevel::Warn);
        assert_eq!(sub.level(), None);

        sub.info("info from sub");
        assert!(out.is_empty());

        sub.warn("warn from sub: \u{3b1} 100%");
        assert!(out.contains("warn from sub: \u{3b1} 100%"));
    });
}

#[test]
fn test_propagation_reaches_ancestors_not_siblings() {
    with_logger("test_propagation", |parent, parent_out| {
        parent.set_level(LogLevel::Debug);

        let left = get_logger("test_propagation.left");
        let right = get_logger("test_propagation.right");

        let right_writer = MemoryWriter::new();
        let right_out = right_writer.buffer();
        right.add_handler(
            Handler::builder("right")
                .formatter(TextFormatter::new())
                .writer(right_writer)
                .build(),
        );

        let left_writer = MemoryWriter::new();
        let left_out = left_writer.buffer();
        left.add_handler(
            Handler::builder("left")
                .formatter(TextFormatter::new())
                .writer(left_writer)
                .build(),
        );

        let msg = unique_message();
        get_logger("test_propagation.left.deep").error(msg.clone());

        assert!(left_out.contains(&msg));
        assert!(parent_out.contains(&msg));
        assert!(!right_out.contains(&msg));
    });
}

#[test]
fn test_shared_handler_invoked_per_appearance() {
    with_logger("test_shared_handler", |parent, out| {
        parent.set_level(LogLevel::Debug);
        let child = get_logger("test_shared_handler.child");
        let handler = parent.handlers()[0].clone();
        child.add_handler(handler.clone());

        child.info("twice");
        assert_eq!(out.lines(), vec!["message=\"twice\"", "message=\"twice\""]);

        child.remove_handler(&handler);
        out.clear();
        child.info("once");
        assert_eq!(out.lines(), vec!["message=\"once\""]);
    });
}

#[test]
fn test_handler_filter_by_logger_name() {
    with_logger("test_filter_log", |logger, out| {
        logger.set_level(LogLevel::Debug);
        let filter: SharedFilter = Arc::new(LoggerNameFilter::new("test_filter_log.main"));
        for handler in logger.handlers() {
            handler.add_filter(filter.clone());
        }

        let main = get_logger("test_filter_log.main");
        let other = get_logger("test_filter_log.other");

        let msg = unique_message();
        main.error(msg.clone());
        assert!(out.contains(&msg));

        out.clear();
        other.error(msg.clone());
        assert!(!out.contains(&msg));

        for handler in logger.handlers() {
            handler.remove_filter(&filter);
        }
        other.error(msg.clone());
        assert!(out.contains(&msg));
    });
}

#[test]
fn test_invalid_json_writes_fallback() {
    with_logger("test_invalid_json", |logger, out| {
        logger.set_level(LogLevel::Debug);
        logger.handlers()[0].set_formatter(JsonFormatter::new());

        logger
            .event("test")
            .field("func", FieldValue::opaque(|| {}))
            .error();
        assert!(out.contains(FORMAT_ERROR_MESSAGE));

        // The handler keeps working afterwards
        out.clear();
        logger.event("next").field("ok", true).error();
        assert_eq!(out.contents(), "{\"event\":\"next\",\"ok\":true}\n");
    });
}

#[test]
fn test_add_extra_macro() {
    with_logger("test_add_extra_macro", |logger, out| {
        let formatter = TextFormatter::new().add_macro("foo", "custom");
        logger.add_extra_macro("custom", "this-is-a-custom-field");
        logger.handlers()[0].set_formatter(formatter);

        logger.event("test").error();
        assert!(out.contains(r#"foo="this-is-a-custom-field" event="test""#));
        assert_eq!(
            out.lines(),
            vec![r#"foo="this-is-a-custom-field" event="test" custom="this-is-a-custom-field""#]
        );
    });
}

#[test]
fn test_add_field_applies_to_later_records_only() {
    with_logger("test_add_field", |logger, out| {
        logger.event("before").error();
        logger.add_field("custom", "this-is-a-custom-field");
        logger.event("test").error();

        let lines = out.lines();
        assert_eq!(lines[0], r#"event="before""#);
        assert_eq!(lines[1], r#"event="test" custom="this-is-a-custom-field""#);
    });
}

#[test]
fn test_logger_handlers() {
    let handler = get_handler("");
    let logger = get_logger("test_logger_handlers");
    logger.add_handler(handler.clone());

    assert_eq!(logger.handlers().len(), 1);
    assert!(Arc::ptr_eq(&logger.handlers()[0], &handler));

    logger.remove_handler(&handler);
    assert_eq!(logger.handlers().len(), 0);
    // Still the registry's default handler
    assert!(Arc::ptr_eq(&get_handler(""), &handler));
}

#[test]
fn test_logger_filters() {
    let filter: SharedFilter = Arc::new(LoggerNameFilter::new("foo"));
    let logger = get_logger("test_logger_filters");
    logger.add_filter(filter.clone());

    assert_eq!(logger.filters().len(), 1);
    assert!(Arc::ptr_eq(&logger.filters()[0], &filter));

    logger.remove_filter(&filter);
    assert_eq!(logger.filters().len(), 0);
}

#[test]
fn test_file_output_and_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("hierarchy.log");

    let registry = Registry::new();
    let handler = Handler::builder("file")
        .formatter(TextFormatter::standard())
        .writer(FileWriter::new(&log_file).expect("Failed to create writer"))
        .build();
    registry.root().add_handler(handler.clone());

    let malicious = "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation";
    registry.get_logger("auth").error(malicious);
    registry.get_logger("auth.session").warn("second line");
    handler.flush();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2, "each record must stay on one line");
    assert!(lines[0].contains("\\nERROR [2024-10-17] Fake error injected\\n"));
    assert!(lines[0].contains(r#"level="ERROR" logger="auth""#));
    assert!(lines[1].contains(r#"logger="auth.session" message="second line""#));
}

#[test]
fn test_config_drives_hierarchy() {
    let registry = Registry::new();
    let writer = MemoryWriter::new();
    let out = writer.buffer();
    registry
        .register_handler(
            Handler::builder("captured")
                .formatter(TextFormatter::new())
                .writer(writer)
                .build(),
        )
        .unwrap();

    let config = RegistryConfig::from_json(
        r#"{"loggers":[
            {"name":"api","level":"INFO","handlers":["captured"],"fields":{"service":"api"}},
            {"name":"api.health","level":"NOTLOG"}
        ]}"#,
    )
    .unwrap();
    registry.apply_config(&config).unwrap();

    registry.get_logger("api.users").info("listed");
    registry.get_logger("api.health").critical("ignored");
    registry.get_logger("api.health.db").debug("ignored too");

    assert_eq!(out.lines(), vec![r#"message="listed""#]);

    out.clear();
    registry.get_logger("api").event("boot").info();
    assert_eq!(out.contents(), "event=\"boot\" service=\"api\"\n");
}
