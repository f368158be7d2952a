//! Async logging example
//!
//! Demonstrates an async file writer shared by loggers on several threads.
//!
//! Run with: cargo run --example async_logging

use rust_log_hierarchy::prelude::*;
use rust_log_hierarchy::{AsyncWriter, Result};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Log Hierarchy - Async Logging Example ===\n");

    let registry = Registry::new();
    let path = std::env::temp_dir().join("rust_log_hierarchy_async.log");

    // Queue up to 1000 records ahead of the file
    let writer = AsyncWriter::new(FileWriter::new(&path)?, 1000);
    let handler = Handler::builder("async-file")
        .formatter(TextFormatter::standard())
        .writer(writer)
        .build();
    registry.root().add_handler(handler.clone());
    registry.root().set_level(LogLevel::Info);

    println!("1. High-throughput logging:");
    let bulk = registry.get_logger("bulk");
    for i in 0..100 {
        bulk.infof(format_args!("Message #{}", i));
    }
    println!("   Logged 100 messages asynchronously");

    println!("\n2. Multi-threaded logging:");
    let mut handles = vec![];
    for thread_id in 0..5 {
        let registry = registry.clone();
        handles.push(thread::spawn(move || {
            let logger = registry.get_logger(&format!("workers.t{}", thread_id));
            for i in 0..20 {
                logger.event("work").field("thread", thread_id).field("seq", i).info();
                thread::sleep(Duration::from_millis(10));
            }
        }));
    }

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker thread panicked");
        }
    }
    println!("   5 threads logged 20 messages each");

    // Wait for the worker to drain the queue
    handler.flush();

    println!("\n=== Example completed successfully! ===");
    println!("Check '{}' for file output", path.display());

    Ok(())
}
