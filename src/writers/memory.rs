//! In-memory writer capturing output for inspection

use crate::core::{Result, Writer};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle onto the bytes captured by a `MemoryWriter`
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryBuffer {
    /// Captured output, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

/// Writer appending every record to a shared in-memory buffer
///
/// # Example
///
/// ```
/// use rust_log_hierarchy::writers::{MemoryWriter, Writer};
///
/// let mut writer = MemoryWriter::new();
/// let buffer = writer.buffer();
/// writer.write(b"hello\n").unwrap();
/// assert_eq!(buffer.contents(), "hello\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryWriter {
    buffer: MemoryBuffer,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> MemoryBuffer {
        self.buffer.clone()
    }
}

impl Writer for MemoryWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.bytes.lock().extend_from_slice(bytes);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
