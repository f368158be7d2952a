//! File logging example
//!
//! Demonstrates a JSON file handler on one subtree next to a text console
//! handler on the root.
//!
//! Run with: cargo run --example file_logging

use rust_log_hierarchy::prelude::*;
use rust_log_hierarchy::Result;

fn main() -> Result<()> {
    println!("=== Rust Log Hierarchy - File Logging Example ===\n");

    let registry = Registry::new();
    let path = std::env::temp_dir().join("rust_log_hierarchy_application.log");

    let console = Handler::builder("console")
        .formatter(TextFormatter::standard().with_colors(true))
        .writer(ConsoleWriter::stdout())
        .build();
    let file = Handler::builder("file")
        .formatter(JsonFormatter::standard())
        .writer(FileWriter::new(&path)?)
        .build();

    let root = registry.root();
    root.add_handler(console);
    root.set_level(LogLevel::Info);

    // Only records from "app.audit" and below reach the file
    let audit = registry.get_logger("app.audit");
    audit.add_handler(file.clone());

    println!("1. Logging to console, and to the file for the audit subtree:");
    let app = registry.get_logger("app");
    app.info("Application started");
    app.debug("Loading configuration...");
    app.info("Configuration loaded successfully");
    audit.event("login").field("user", "alice").field("success", true).info();
    audit.event("login").field("user", "mallory").field("success", false).warn();

    println!("\n2. Performing some operations:");
    for i in 1..=5 {
        app.infof(format_args!("Processing item {}/5", i));
        if i == 3 {
            audit.warn("Item 3 took longer than expected");
        }
    }
    app.info("All operations completed");

    // Flush to ensure all records are written
    file.flush();

    println!("\n=== Example completed successfully! ===");
    println!(
        "Check '{}' for the audit records ({} written)",
        path.display(),
        file.metrics().written_count()
    );

    Ok(())
}
