//! Asynchronous writer backed by a worker thread
//!
//! Records are queued on a bounded channel and written by a dedicated thread,
//! taking slow I/O off the caller's path. When the queue is full the caller
//! blocks until the worker catches up, so no record is dropped.

use crate::core::{LoggerError, Result, Writer};
use crossbeam_channel::{bounded, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Default time allowed for the worker to drain on drop
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Write(Vec<u8>),
    Flush(Sender<Result<()>>),
}

pub struct AsyncWriter {
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    shutdown_timeout: Duration,
}

impl AsyncWriter {
    /// Spawn a worker writing into `inner` with a queue of `buffer_size` records
    pub fn new<W: Writer + 'static>(inner: W, buffer_size: usize) -> Self {
        let (sender, receiver) = bounded::<Command>(buffer_size.max(1));
        let mut inner: Box<dyn Writer> = Box::new(inner);

        let worker = thread::Builder::new()
            .name("log-async-writer".to_string())
            .spawn(move || {
                for command in receiver {
                    match command {
                        Command::Write(bytes) => {
                            if let Err(e) = inner.write(&bytes) {
                                eprintln!(
                                    "[LOGGER ERROR] Async writer '{}' failed: {}",
                                    inner.name(),
                                    e
                                );
                            }
                        }
                        Command::Flush(ack) => {
                            let _ = ack.send(inner.flush());
                        }
                    }
                }
                // Channel closed: final flush before exiting
                if let Err(e) = inner.flush() {
                    eprintln!("[LOGGER ERROR] Async writer '{}' final flush failed: {}", inner.name(), e);
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("[LOGGER CRITICAL] Failed to spawn async writer thread: {}", e);
                None
            }
        };

        Self {
            sender: worker.as_ref().map(|_| sender),
            worker,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Close the queue and wait up to `timeout` for pending records
    ///
    /// Returns `true` if the worker drained everything in time.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Async writer thread panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Async writer thread did not finish within {:?} timeout. \
                     Some logs may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    fn sender(&self) -> Result<&Sender<Command>> {
        self.sender.as_ref().ok_or(LoggerError::ChannelSendError)
    }
}

impl Writer for AsyncWriter {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.sender()?
            .send(Command::Write(bytes.to_vec()))
            .map_err(|_| LoggerError::ChannelSendError)
    }

    /// Waits until every record queued before this call has been written
    fn flush(&mut self) -> Result<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.sender()?
            .send(Command::Flush(ack_tx))
            .map_err(|_| LoggerError::ChannelSendError)?;
        ack_rx
            .recv_timeout(self.shutdown_timeout)
            .map_err(|_| LoggerError::writer("async writer did not acknowledge flush"))?
    }

    fn name(&self) -> &str {
        "async"
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        let timeout = self.shutdown_timeout;
        self.shutdown(timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writers::MemoryWriter;

    #[test]
    fn test_flush_waits_for_queued_records() {
        let memory = MemoryWriter::new();
        let buffer = memory.buffer();
        let mut writer = AsyncWriter::new(memory, 4);

        for i in 0..20 {
            writer.write(format!("record {}\n", i).as_bytes()).unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(buffer.lines().len(), 20);
        assert_eq!(buffer.lines()[19], "record 19");
    }

    #[test]
    fn test_drop_drains_queue() {
        let memory = MemoryWriter::new();
        let buffer = memory.buffer();
        {
            let mut writer = AsyncWriter::new(memory, 100);
            for _ in 0..50 {
                writer.write(b"x\n").unwrap();
            }
        }
        assert_eq!(buffer.lines().len(), 50);
    }

    #[test]
    fn test_write_after_shutdown_fails() {
        let mut writer = AsyncWriter::new(MemoryWriter::new(), 1);
        assert!(writer.shutdown(Duration::from_secs(1)));
        assert!(matches!(
            writer.write(b"late\n"),
            Err(LoggerError::ChannelSendError)
        ));
    }
}
