//! Sink metrics for observability
//!
//! Counters for monitoring sink health: queued and written records, routing
//! misses, write failures, and records abandoned at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for sink observability
///
/// # Example
///
/// ```
/// use rotolog::SinkMetrics;
///
/// let metrics = SinkMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_written();
/// assert_eq!(metrics.enqueued_count(), 1);
/// assert_eq!(metrics.written_count(), 1);
/// ```
#[derive(Debug)]
pub struct SinkMetrics {
    /// Records accepted into the queue (or written synchronously)
    enqueued: AtomicU64,

    /// Records successfully appended to a destination file
    written: AtomicU64,

    /// Records discarded because no appender matched the routed name
    unrouted: AtomicU64,

    /// Records lost to an appender I/O failure
    write_errors: AtomicU64,

    /// Records still queued when the shutdown drain timed out
    abandoned: AtomicU64,
}

impl SinkMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn unrouted_count(&self) -> u64 {
        self.unrouted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_error_count(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn abandoned_count(&self) -> u64 {
        self.abandoned.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unrouted(&self) -> u64 {
        self.unrouted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_abandoned(&self, count: u64) -> u64 {
        self.abandoned.fetch_add(count, Ordering::Relaxed)
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.written.store(0, Ordering::Relaxed);
        self.unrouted.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        self.abandoned.store(0, Ordering::Relaxed);
    }
}

impl Default for SinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = SinkMetrics::new();
        assert_eq!(metrics.enqueued_count(), 0);
        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.unrouted_count(), 0);
        assert_eq!(metrics.write_error_count(), 0);
        assert_eq!(metrics.abandoned_count(), 0);
    }

    #[test]
    fn test_metrics_record_and_reset() {
        let metrics = SinkMetrics::new();
        metrics.record_enqueued();
        metrics.record_enqueued();
        metrics.record_written();
        metrics.record_unrouted();
        metrics.record_write_error();
        metrics.record_abandoned(3);

        assert_eq!(metrics.enqueued_count(), 2);
        assert_eq!(metrics.written_count(), 1);
        assert_eq!(metrics.unrouted_count(), 1);
        assert_eq!(metrics.write_error_count(), 1);
        assert_eq!(metrics.abandoned_count(), 3);

        metrics.reset();
        assert_eq!(metrics.enqueued_count(), 0);
        assert_eq!(metrics.abandoned_count(), 0);
    }
}
