//! Console writer implementation

use crate::core::{Result, Writer};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes records to the process's stdout or stderr
#[derive(Debug)]
pub struct ConsoleWriter {
    stream: Stream,
}

impl ConsoleWriter {
    pub fn stdout() -> Self {
        Self {
            stream: Stream::Stdout,
        }
    }

    pub fn stderr() -> Self {
        Self {
            stream: Stream::Stderr,
        }
    }
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Writer for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        match self.stream {
            Stream::Stdout => std::io::stdout().lock().write_all(bytes)?,
            Stream::Stderr => std::io::stderr().lock().write_all(bytes)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.stream {
            Stream::Stdout => std::io::stdout().flush()?,
            Stream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.stream {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}
