//! Core sink types: records, configuration, errors, metrics, and the queue
//! processor

pub mod config;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod record;

pub use config::{AppenderConfig, Router, SinkConfig};
pub use error::{Result, SinkError};
pub use metrics::SinkMetrics;
pub use processor::{QueueProcessor, DEFAULT_SHUTDOWN_TIMEOUT, MAX_QUEUED_RECORDS};
pub use record::LogRecord;
