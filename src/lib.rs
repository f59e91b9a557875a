//! # rotolog
//!
//! An asynchronous, rotating file log sink. Caller threads hand over
//! already-formatted records; a bounded queue with a single background
//! consumer persists them to named destination files under a size- and
//! count-based rotation/retention policy, without blocking callers on disk
//! I/O.
//!
//! ## Features
//!
//! - **Non-blocking write path**: producers only touch a bounded channel;
//!   all file I/O runs on one consumer thread
//! - **Per-destination rotation**: size-triggered archival with dated,
//!   sequenced archive names and oldest-first retention pruning
//! - **Hot reload**: routing function and destination set are replaceable at
//!   runtime without tearing an in-flight dispatch
//! - **Loss-bounded failure handling**: an I/O failure costs at most the one
//!   record being written, never the consumer thread
//!
//! ## Example
//!
//! ```no_run
//! use rotolog::{AppenderConfig, LogRecord, QueueProcessor, SinkConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = SinkConfig::new(Arc::new(|category: &str| {
//!     if category.starts_with("audit") {
//!         "audit".to_string()
//!     } else {
//!         "app".to_string()
//!     }
//! }))
//! .with_appender(AppenderConfig::new("app", "logs/app.log"))
//! .with_appender(
//!     AppenderConfig::new("audit", "logs/audit.log")
//!         .with_max_file_size(20 * 1024 * 1024)
//!         .with_max_history(30),
//! );
//!
//! let mut sink = QueueProcessor::new(config).unwrap();
//! sink.enqueue(LogRecord::new("app.web", "2025-08-29 12:00:00 GET /\n"));
//! sink.enqueue(LogRecord::new("audit.login", "2025-08-29 12:00:01 user=alice\n"));
//! sink.shutdown(Duration::from_secs(2));
//! ```

pub mod appenders;
pub mod core;

pub mod prelude {
    pub use crate::appenders::{AppenderRegistry, FileAppender};
    pub use crate::core::{
        AppenderConfig, LogRecord, QueueProcessor, Result, Router, SinkConfig, SinkError,
        SinkMetrics, DEFAULT_SHUTDOWN_TIMEOUT, MAX_QUEUED_RECORDS,
    };
}

pub use crate::appenders::{AppenderRegistry, FileAppender};
pub use crate::core::{
    AppenderConfig, LogRecord, QueueProcessor, Result, Router, SinkConfig, SinkError, SinkMetrics,
    DEFAULT_SHUTDOWN_TIMEOUT, MAX_QUEUED_RECORDS,
};
