//! Basic hierarchy usage example
//!
//! Demonstrates named loggers, inherited levels and structured events on the
//! console.
//!
//! Run with: cargo run --example basic_usage

use rust_log_hierarchy::prelude::*;
use rust_log_hierarchy::{info, Result};

fn main() -> Result<()> {
    println!("=== Rust Log Hierarchy - Basic Usage Example ===\n");

    // The default handler writes standard text lines to stdout
    let root = get_logger("");
    root.add_handler(get_handler(""));
    root.set_level(LogLevel::Debug);

    println!("1. Logging at different levels:");
    let app = get_logger("app");
    app.debug("This is a debug message");
    app.info("This is an info message");
    app.warn("This is a warning message");
    app.error("This is an error message");
    app.critical("This is a critical message");

    println!("\n2. Children inherit the nearest explicit level:");
    let db = get_logger("app.db");
    app.set_level(LogLevel::Warn);
    db.info("Info message (hidden)");
    db.warn("Warning message (visible)");

    db.set_level(LogLevel::Debug);
    db.debug("Debug message (visible, app.db overrides app)");

    println!("\n3. Structured events and logger fields:");
    let http = get_logger("app.http");
    http.set_level(LogLevel::Info);
    http.add_field("service", "frontend");
    http.event("request")
        .field("method", "GET")
        .field("path", "/index.html")
        .field("status", 200)
        .info();
    info!(http, "Served {} requests", 1);

    println!("\n4. Silencing a subtree:");
    app.set_level(LogLevel::NotLog);
    get_logger("app.cache").critical("Never shown");

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
