//! Error types for the file sink

pub type Result<T> = std::result::Result<T, SinkError>;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// Archive/rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Appender has been closed by shutdown or reload
    #[error("Appender for '{path}' is closed")]
    AppenderClosed { path: String },
}

impl SinkError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        SinkError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        SinkError::WriterError(msg.into())
    }

    /// Create a closed-appender error
    pub fn appender_closed(path: impl Into<String>) -> Self {
        SinkError::AppenderClosed { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SinkError::config("FileAppender", "duplicate name 'app'");
        assert!(matches!(err, SinkError::InvalidConfiguration { .. }));

        let err = SinkError::file_appender("/var/log/app.log", "Permission denied");
        assert!(matches!(err, SinkError::FileAppenderError { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = SinkError::file_rotation("/var/log/app.log", "Disk full");
        assert_eq!(
            err.to_string(),
            "File rotation failed for '/var/log/app.log': Disk full"
        );

        let err = SinkError::config("registry", "no appenders");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for registry: no appenders"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = SinkError::io_operation("creating log directory", "cannot create parent", io_err);

        assert!(matches!(err, SinkError::IoOperation { .. }));
        assert!(err.to_string().contains("creating log directory"));
        assert!(err.to_string().contains("cannot create parent"));
    }
}
