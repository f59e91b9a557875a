//! Per-destination file appender with size-based rotation
//!
//! One appender owns one destination file. Appenders are only ever driven
//! from the queue processor's consumer thread (plus the synchronous shutdown
//! path, serialized by the registry mutex), so they carry no internal
//! locking.

use crate::appenders::archive;
use crate::core::config::AppenderConfig;
use crate::core::error::{Result, SinkError};
use chrono::{DateTime, Duration, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Flush after this many writes since the appender opened
const FLUSH_EVERY_WRITES: u64 = 100;

/// Flush when the gap between record timestamps exceeds this
const FLUSH_STALENESS_MS: i64 = 300;

/// Appender owning one destination file and its rotation state.
///
/// `write` never surfaces an error: I/O failures are reported to stderr and
/// cost at most the one message being written. The fallible path is exposed
/// as [`try_write`](FileAppender::try_write) so callers (and tests) can
/// observe the outcome before it is suppressed.
#[derive(Debug)]
pub struct FileAppender {
    path: PathBuf,
    config: AppenderConfig,
    writer: Option<BufWriter<File>>,
    /// Running size of the live file; seeded from metadata, bumped per write
    current_size: u64,
    write_count: u64,
    /// Timestamp of the previously written record
    last_write: Option<DateTime<Local>>,
    /// Set by `close`; distinguishes an intentionally released handle from
    /// one lost to a failed rotation
    closed: bool,
}

impl FileAppender {
    /// Create an appender for the configured destination, resolving a
    /// relative path against `base_dir` (or the process current directory).
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be opened. Both are fatal to construction and propagate
    /// to the registry build.
    pub fn new(config: AppenderConfig, base_dir: Option<&Path>) -> Result<Self> {
        let path = if config.file.is_absolute() {
            config.file.clone()
        } else {
            match base_dir {
                Some(dir) => dir.join(&config.file),
                None => std::env::current_dir()
                    .map_err(|e| {
                        SinkError::io_operation(
                            "resolving log path",
                            "cannot determine current directory",
                            e,
                        )
                    })?
                    .join(&config.file),
            }
        };

        let parent = path.parent().ok_or_else(|| {
            SinkError::config(
                "FileAppender",
                format!("no parent folder: {}", path.display()),
            )
        })?;
        fs::create_dir_all(parent).map_err(|e| {
            SinkError::io_operation(
                "creating log directory",
                format!("failed to create directory '{}'", parent.display()),
                e,
            )
        })?;

        let mut appender = Self {
            path,
            config,
            writer: None,
            current_size: 0,
            write_count: 0,
            last_write: None,
            closed: false,
        };
        appender.reopen()?;
        Ok(appender)
    }

    /// Append an already-formatted message, reporting any failure to stderr.
    ///
    /// At most this one message is lost on failure; the appender recovers on
    /// the next call.
    pub fn write(&mut self, timestamp: DateTime<Local>, message: &str) {
        if let Err(e) = self.try_write(timestamp, message) {
            eprintln!(
                "[SINK ERROR] Write to '{}' failed: {}",
                self.path.display(),
                e
            );
        }
    }

    /// Fallible write path: rotate if the message would overflow the live
    /// file, append the bytes, then flush per the cadence policy.
    pub fn try_write(&mut self, timestamp: DateTime<Local>, message: &str) -> Result<()> {
        // A closed appender stays closed; the caller decides whether to
        // re-dispatch or to reopen through `write_through`.
        if self.closed {
            return Err(SinkError::appender_closed(self.path.display().to_string()));
        }

        // Recover the handle if a previous rotation failed mid-way. The
        // refreshed size hint re-arms the rotation check for the retry.
        if self.writer.is_none() {
            self.reopen()?;
        }

        let bytes = message.as_bytes();
        if self.current_size + bytes.len() as u64 > self.config.max_file_size {
            self.rotate()?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SinkError::writer("file writer not initialized"))?;
        writer.write_all(bytes).map_err(|e| {
            SinkError::file_appender(
                self.path.display().to_string(),
                format!("failed to write record: {e}"),
            )
        })?;
        self.current_size += bytes.len() as u64;
        self.write_count += 1;

        // Batch small bursts, bound staleness: flush every 100th write or
        // when record timestamps are more than 300 ms apart.
        if self.write_count % FLUSH_EVERY_WRITES == 0 || self.is_stale(timestamp) {
            self.flush()?;
        }

        self.last_write = Some(timestamp);
        Ok(())
    }

    /// Write a message and force it to disk, reopening a closed appender.
    ///
    /// This is the synchronous path for records that arrive after the queue
    /// has shut down: there is no consumer left to flush later, so the
    /// cadence policy does not apply.
    pub fn write_through(&mut self, timestamp: DateTime<Local>, message: &str) -> Result<()> {
        self.closed = false;
        self.try_write(timestamp, message)?;
        self.flush()
    }

    fn is_stale(&self, timestamp: DateTime<Local>) -> bool {
        match self.last_write {
            Some(last) => {
                timestamp.signed_duration_since(last) > Duration::milliseconds(FLUSH_STALENESS_MS)
            }
            // First write after open always flushes
            None => true,
        }
    }

    /// Close the live file, move it aside as an archive, and start a fresh
    /// one. On archive failure the handle stays closed and the file stays
    /// oversized; the next write reopens and retries the rotation.
    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                SinkError::file_rotation(
                    self.path.display().to_string(),
                    format!("failed to flush before rotation: {e}"),
                )
            })?;
        }

        archive::archive(&self.path, self.config.max_history)?;
        self.reopen()
    }

    fn reopen(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                SinkError::file_appender(
                    self.path.display().to_string(),
                    format!("failed to open: {e}"),
                )
            })?;
        let metadata = file.metadata().map_err(|e| {
            SinkError::file_appender(
                self.path.display().to_string(),
                format!("cannot access file metadata: {e}"),
            )
        })?;
        self.current_size = metadata.len();
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    /// Flush buffered bytes to the OS
    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                SinkError::file_appender(
                    self.path.display().to_string(),
                    format!("failed to flush: {e}"),
                )
            })?;
        }
        Ok(())
    }

    /// Flush and release the file handle. Subsequent `try_write` calls are
    /// rejected until the appender is explicitly reopened.
    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        let flushed = self.flush();
        self.writer = None;
        flushed
    }

    /// Resolved destination path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size hint for the live file
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// The configuration this appender was built from
    #[must_use]
    pub fn config(&self) -> &AppenderConfig {
        &self.config
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Best effort flush; errors are meaningless mid-teardown
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
