//! Log record value type

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single already-formatted log record.
///
/// Records are produced by an external formatter and consumed exactly once by
/// the queue processor. The sink never inspects or rewrites `message`; it is
/// appended to the destination file byte-for-byte. `category` is only used to
/// pick a destination via the routing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Time the record was created by the caller
    pub timestamp: DateTime<Local>,
    /// Logger category, input to the routing function
    pub category: String,
    /// Fully formatted message, written verbatim
    pub message: String,
}

impl LogRecord {
    /// Create a record stamped with the current local time
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            category: category.into(),
            message: message.into(),
        }
    }

    /// Create a record with a caller-supplied timestamp
    pub fn with_timestamp(
        timestamp: DateTime<Local>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            category: category.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_value_equality() {
        let ts = Local::now();
        let a = LogRecord::with_timestamp(ts, "app.web", "GET /index\n");
        let b = LogRecord::with_timestamp(ts, "app.web", "GET /index\n");
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_new_stamps_now() {
        let before = Local::now();
        let record = LogRecord::new("app", "hello\n");
        let after = Local::now();
        assert!(record.timestamp >= before && record.timestamp <= after);
        assert_eq!(record.category, "app");
        assert_eq!(record.message, "hello\n");
    }
}
