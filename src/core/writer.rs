//! Writer trait for formatted record destinations

use super::error::Result;

/// Destination for formatted records.
///
/// A handler owns exactly one writer and serializes access to it, so
/// implementations receive `&mut self`. Each call to `write` carries one
/// complete, newline-terminated record.
pub trait Writer: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Best-effort flush of buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
