//! Writer implementations

pub mod async_writer;
pub mod console;
pub mod file;
pub mod memory;

pub use async_writer::AsyncWriter;
pub use console::ConsoleWriter;
pub use file::FileWriter;
pub use memory::{MemoryBuffer, MemoryWriter};

pub use crate::core::Writer;
