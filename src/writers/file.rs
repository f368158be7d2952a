//! File writer implementation

use crate::core::{LoggerError, Result, Writer};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends records to a file
///
/// Output is buffered and flushed on `flush` and on drop. With
/// `with_locking(true)` (feature `file`), every record is written under an
/// exclusive advisory lock and flushed immediately, so several processes can
/// share one log file.
#[derive(Debug)]
pub struct FileWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    locking: bool,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            locking: false,
        })
    }

    /// Take an exclusive advisory lock around every record
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use rust_log_hierarchy::writers::FileWriter;
    ///
    /// let writer = FileWriter::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_locking(true);
    /// ```
    #[must_use]
    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(feature = "file")]
    fn write_locked(writer: &mut BufWriter<File>, bytes: &[u8]) -> Result<()> {
        use fs2::FileExt;

        writer.get_ref().lock_exclusive()?;
        let result = writer.write_all(bytes).and_then(|()| writer.flush());
        let unlocked = writer.get_ref().unlock();
        result?;
        unlocked?;
        Ok(())
    }

    #[cfg(not(feature = "file"))]
    fn write_locked(writer: &mut BufWriter<File>, bytes: &[u8]) -> Result<()> {
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl Writer for FileWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("File writer not initialized"))?;

        if self.locking {
            Self::write_locked(writer, bytes)
        } else {
            writer.write_all(bytes)?;
            Ok(())
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileWriter {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
