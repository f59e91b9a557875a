//! Bounded queue and background consumer
//!
//! The [`QueueProcessor`] is the only cross-thread boundary of the sink:
//! arbitrary caller threads enqueue records into a bounded channel, a single
//! named consumer thread drains it and routes each record to its appender.
//! All file I/O and rotation happen on that one thread, which is why the
//! appenders themselves need no locking.

use crate::appenders::registry::AppenderRegistry;
use crate::core::config::{Router, SinkConfig};
use crate::core::error::{Result, SinkError};
use crate::core::metrics::SinkMetrics;
use crate::core::record::LogRecord;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Queue capacity; enqueue blocks (backpressure) once this many records are
/// buffered
pub const MAX_QUEUED_RECORDS: usize = 1024;

/// Drain timeout used when the processor is dropped without an explicit
/// [`QueueProcessor::shutdown`]
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(1500);

/// One routing function plus one appender registry, replaced wholesale on
/// reload. A dispatch reads exactly one snapshot, so it can never observe a
/// half-swapped configuration.
struct Dispatch {
    router: Router,
    registry: AppenderRegistry,
}

impl Dispatch {
    fn build(config: &SinkConfig) -> Result<Self> {
        let registry = AppenderRegistry::build(&config.appenders, config.base_dir.as_deref())?;
        Ok(Self {
            router: Arc::clone(&config.router),
            registry,
        })
    }
}

/// Owner of the bounded record queue and its single consumer thread.
///
/// Lifecycle: **Running** (enqueues accepted, consumer draining) transitions
/// to **Draining** when [`shutdown`](QueueProcessor::shutdown) closes the
/// queue, then to **Stopped** once the consumer joins or the drain timeout
/// elapses and all appenders are released.
///
/// # Example
///
/// ```no_run
/// use rotolog::{AppenderConfig, LogRecord, QueueProcessor, SinkConfig};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let config = SinkConfig::new(Arc::new(|category: &str| {
///     category.split('.').next().unwrap_or("app").to_string()
/// }))
/// .with_appender(AppenderConfig::new("app", "/var/log/myapp/app.log"));
///
/// let mut processor = QueueProcessor::new(config).unwrap();
/// processor.enqueue(LogRecord::new("app.web", "GET /index 200\n"));
/// assert!(processor.shutdown(Duration::from_secs(2)));
/// ```
pub struct QueueProcessor {
    dispatch: Arc<RwLock<Arc<Dispatch>>>,
    metrics: Arc<SinkMetrics>,
    sender: Option<Sender<LogRecord>>,
    /// Kept to count records abandoned when the drain times out
    receiver: Receiver<LogRecord>,
    worker: Option<thread::JoinHandle<()>>,
}

impl QueueProcessor {
    /// Create a processor with the default queue capacity.
    ///
    /// # Errors
    ///
    /// Fails when any configured appender cannot be constructed; nothing is
    /// spawned in that case.
    pub fn new(config: SinkConfig) -> Result<Self> {
        Self::with_capacity(config, MAX_QUEUED_RECORDS)
    }

    /// Create a processor with an explicit queue capacity.
    pub fn with_capacity(config: SinkConfig, capacity: usize) -> Result<Self> {
        let dispatch = Arc::new(RwLock::new(Arc::new(Dispatch::build(&config)?)));
        let metrics = Arc::new(SinkMetrics::new());
        let (sender, receiver) = bounded(capacity);

        let worker_dispatch = Arc::clone(&dispatch);
        let worker_metrics = Arc::clone(&metrics);
        let worker_receiver = receiver.clone();
        let worker = thread::Builder::new()
            .name("rotolog-consumer".into())
            .spawn(move || {
                Self::process_queue(worker_receiver, worker_dispatch, worker_metrics);
            })
            .map_err(|e| {
                SinkError::io_operation(
                    "spawning consumer thread",
                    "cannot start queue consumer",
                    e,
                )
            })?;

        Ok(Self {
            dispatch,
            metrics,
            sender: Some(sender),
            receiver,
            worker: Some(worker),
        })
    }

    /// Consumer loop: drain until the channel is closed and empty. Nothing
    /// in the write path may terminate this thread; per-record failures are
    /// reported and swallowed inside `write_record`.
    fn process_queue(
        receiver: Receiver<LogRecord>,
        dispatch: Arc<RwLock<Arc<Dispatch>>>,
        metrics: Arc<SinkMetrics>,
    ) {
        while let Ok(record) = receiver.recv() {
            Self::write_record(&dispatch, &metrics, &record);
        }
    }

    /// Route and write one record. Unrouted categories are discarded by
    /// design; appender failures cost that one record.
    fn write_record(dispatch: &RwLock<Arc<Dispatch>>, metrics: &SinkMetrics, record: &LogRecord) {
        // One snapshot per dispatch; a concurrent reload cannot tear this.
        let snapshot = {
            let guard = dispatch.read();
            Arc::clone(&*guard)
        };

        let name = (snapshot.router)(&record.category);
        match snapshot.registry.get(&name) {
            Some(appender) => {
                // Bind the outcome so the appender lock is released before
                // any re-dispatch below.
                let outcome = appender.lock().try_write(record.timestamp, &record.message);
                match outcome {
                    Ok(()) => {
                        metrics.record_written();
                    }
                    // A reload closed this appender between taking the
                    // snapshot and acquiring its lock. Re-dispatch through
                    // the current registry instead of resurrecting the old
                    // handle.
                    Err(SinkError::AppenderClosed { .. }) => {
                        Self::write_record_sync(dispatch, metrics, record);
                    }
                    Err(e) => {
                        metrics.record_write_error();
                        eprintln!("[SINK ERROR] Write to destination '{name}' failed: {e}");
                    }
                }
            }
            None => {
                metrics.record_unrouted();
            }
        }
    }

    /// Route and write one record through the current dispatch, forcing the
    /// bytes to disk. Used when no later flush can be relied on: records
    /// arriving after the queue closed, and records re-dispatched across a
    /// reload.
    fn write_record_sync(
        dispatch: &RwLock<Arc<Dispatch>>,
        metrics: &SinkMetrics,
        record: &LogRecord,
    ) {
        let snapshot = {
            let guard = dispatch.read();
            Arc::clone(&*guard)
        };

        let name = (snapshot.router)(&record.category);
        match snapshot.registry.get(&name) {
            Some(appender) => {
                match appender
                    .lock()
                    .write_through(record.timestamp, &record.message)
                {
                    Ok(()) => {
                        metrics.record_written();
                    }
                    Err(e) => {
                        metrics.record_write_error();
                        eprintln!("[SINK ERROR] Write to destination '{name}' failed: {e}");
                    }
                }
            }
            None => {
                metrics.record_unrouted();
            }
        }
    }

    /// Queue a record for the consumer thread, blocking while the queue is
    /// full.
    ///
    /// Once the queue has closed (shutdown in progress or completed), the
    /// record is written synchronously on the calling thread and flushed
    /// immediately, so a shutdown race never silently loses it.
    pub fn enqueue(&self, record: LogRecord) {
        self.metrics.record_enqueued();

        let record = match &self.sender {
            Some(sender) => match sender.send(record) {
                Ok(()) => return,
                // Closed between the state check and the send
                Err(err) => err.into_inner(),
            },
            None => record,
        };

        Self::write_record_sync(&self.dispatch, &self.metrics, &record);
    }

    /// Atomically replace the routing function and the appender registry.
    ///
    /// The new registry is built first; on failure the old configuration
    /// stays in effect. The old appenders are closed under the dispatch
    /// write lock, which waits out any in-flight write. A consumer still
    /// holding the old snapshot finds its appender closed and re-dispatches
    /// through the new registry, so each record lands in exactly one
    /// appender and never a stale one.
    pub fn reload(&self, config: SinkConfig) -> Result<()> {
        let fresh = Arc::new(Dispatch::build(&config)?);

        let mut guard = self.dispatch.write();
        let old = std::mem::replace(&mut *guard, fresh);
        old.registry.close_all();
        drop(guard);
        Ok(())
    }

    /// Stop accepting queued records, wait up to `timeout` for the consumer
    /// to drain, then release all appenders regardless.
    ///
    /// Returns `true` when the drain completed in time. On `false`, records
    /// still queued are counted in [`SinkMetrics::abandoned_count`]; the
    /// detached consumer keeps draining best-effort until process exit.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        // Running -> Draining: closing the channel is the signal
        drop(self.sender.take());

        let mut drained = true;
        if let Some(worker) = self.worker.take() {
            let start = Instant::now();
            loop {
                if worker.is_finished() {
                    if let Err(e) = worker.join() {
                        eprintln!(
                            "[SINK ERROR] Consumer thread panicked during shutdown: {e:?}"
                        );
                        drained = false;
                    }
                    break;
                }

                if start.elapsed() >= timeout {
                    let pending = self.receiver.len() as u64;
                    self.metrics.record_abandoned(pending);
                    eprintln!(
                        "[SINK WARNING] Consumer did not drain within {timeout:?}; \
                         {pending} queued records abandoned."
                    );
                    drained = false;
                    break;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }

        // Draining -> Stopped: release appenders whether or not the drain
        // finished
        self.dispatch.read().registry.close_all();
        drained
    }

    /// Whether the queue is still accepting records
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Observability counters for this processor
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }
}

impl Drop for QueueProcessor {
    fn drop(&mut self) {
        if self.sender.is_some() || self.worker.is_some() {
            self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppenderConfig;
    use std::path::Path;
    use tempfile::tempdir;

    fn config(dir: &Path) -> SinkConfig {
        SinkConfig::new(Arc::new(|category: &str| category.to_string()))
            .with_appender(AppenderConfig::new("app", "app.log"))
            .with_base_dir(dir)
    }

    #[test]
    fn test_enqueue_drains_to_file() {
        let dir = tempdir().unwrap();
        let mut processor = QueueProcessor::new(config(dir.path())).unwrap();

        for i in 0..10 {
            processor.enqueue(LogRecord::new("app", format!("line {i}\n")));
        }
        assert!(processor.shutdown(Duration::from_secs(5)));

        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "line 0");
        assert_eq!(lines[9], "line 9");
        assert_eq!(processor.metrics().written_count(), 10);
    }

    #[test]
    fn test_enqueue_after_shutdown_writes_synchronously() {
        let dir = tempdir().unwrap();
        let mut processor = QueueProcessor::new(config(dir.path())).unwrap();

        // A drained record first, so the late arrival lands close enough in
        // time that no flush cadence rule would fire on its own.
        processor.enqueue(LogRecord::new("app", "before shutdown\n"));
        assert!(processor.shutdown(Duration::from_secs(5)));
        assert!(!processor.is_running());

        processor.enqueue(LogRecord::new("app", "late arrival\n"));

        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.contains("before shutdown"));
        assert!(content.contains("late arrival"));
    }

    #[test]
    fn test_closed_appender_redispatches_to_current_registry() {
        let dir = tempdir().unwrap();
        let processor = QueueProcessor::new(config(dir.path())).unwrap();

        // Close the live appenders the way a reload swap does, then drive
        // the consumer write path directly: the record must recover through
        // the current dispatch, not resurrect the closed handle unflushed.
        processor.dispatch.read().registry.close_all();
        let record = LogRecord::new("app", "survived swap\n");
        QueueProcessor::write_record(&processor.dispatch, &processor.metrics, &record);

        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.contains("survived swap"));
        assert_eq!(processor.metrics().written_count(), 1);
    }

    #[test]
    fn test_unrouted_category_is_discarded() {
        let dir = tempdir().unwrap();
        let mut processor = QueueProcessor::new(config(dir.path())).unwrap();

        processor.enqueue(LogRecord::new("nowhere", "lost\n"));
        assert!(processor.shutdown(Duration::from_secs(5)));

        assert_eq!(processor.metrics().unrouted_count(), 1);
        assert_eq!(processor.metrics().written_count(), 0);
        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_bad_config_fails_construction() {
        let dir = tempdir().unwrap();
        let bad = SinkConfig::new(Arc::new(|c: &str| c.to_string()))
            .with_appender(AppenderConfig::new("a", "x.log"))
            .with_appender(AppenderConfig::new("a", "y.log"))
            .with_base_dir(dir.path());
        assert!(QueueProcessor::new(bad).is_err());
    }

    #[test]
    fn test_reload_failure_keeps_old_config() {
        let dir = tempdir().unwrap();
        let mut processor = QueueProcessor::new(config(dir.path())).unwrap();

        let bad = SinkConfig::new(Arc::new(|c: &str| c.to_string()))
            .with_appender(AppenderConfig::new("a", "x.log"))
            .with_appender(AppenderConfig::new("a", "y.log"))
            .with_base_dir(dir.path());
        assert!(processor.reload(bad).is_err());

        // Old routing still works
        processor.enqueue(LogRecord::new("app", "still here\n"));
        assert!(processor.shutdown(Duration::from_secs(5)));
        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert!(content.contains("still here"));
    }
}
