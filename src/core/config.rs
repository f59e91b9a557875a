//! Sink and appender configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Routing function mapping a logger category to a destination name.
///
/// Categories the router maps to a name with no configured appender are
/// silently discarded by the dispatcher.
pub type Router = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Configuration for a single named destination file
///
/// # Examples
///
/// ```
/// use rotolog::AppenderConfig;
///
/// let config = AppenderConfig::new("app", "logs/app.log")
///     .with_max_file_size(50 * 1024 * 1024)
///     .with_max_history(14);
///
/// assert_eq!(config.name, "app");
/// assert_eq!(config.max_history, 14);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppenderConfig {
    /// Destination name, the routing key; unique across a registry
    pub name: String,

    /// Destination file path; relative paths resolve against the sink base
    /// directory
    pub file: PathBuf,

    /// Maximum size of the live file before it is archived
    pub max_file_size: u64,

    /// Maximum number of archive files to keep
    pub max_history: usize,

    /// Declared cap on total archive size. Accepted and stored but not
    /// currently enforced by the write path.
    pub total_size_cap: u64,

    /// Whether archive cleanup should run at startup. Accepted and stored
    /// but not currently enforced.
    pub clean_history_on_start: bool,
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            file: PathBuf::new(),
            max_file_size: 10 * 1024 * 1024, // 10 MiB
            max_history: 7,
            total_size_cap: 0,
            clean_history_on_start: false,
        }
    }
}

impl AppenderConfig {
    /// Create a config for a named destination with default rotation limits
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            ..Self::default()
        }
    }

    /// Set the maximum live file size in bytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the maximum number of retained archives
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_history(mut self, count: usize) -> Self {
        self.max_history = count;
        self
    }

    /// Set the declared total archive size cap
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_total_size_cap(mut self, bytes: u64) -> Self {
        self.total_size_cap = bytes;
        self
    }

    /// Set whether archives should be cleaned at startup
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_clean_history_on_start(mut self, clean: bool) -> Self {
        self.clean_history_on_start = clean;
        self
    }
}

/// Full sink configuration: an ordered list of destinations plus the routing
/// function, replaceable at runtime via `QueueProcessor::reload`.
#[derive(Clone)]
pub struct SinkConfig {
    /// Destination configs, names unique
    pub appenders: Vec<AppenderConfig>,
    /// Category routing function
    pub router: Router,
    /// Base directory for relative destination paths; the process current
    /// directory when unset
    pub base_dir: Option<PathBuf>,
}

impl SinkConfig {
    /// Create a config with the given routing function and no destinations
    pub fn new(router: Router) -> Self {
        Self {
            appenders: Vec::new(),
            router,
            base_dir: None,
        }
    }

    /// Add a destination
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_appender(mut self, appender: AppenderConfig) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Set the base directory for relative destination paths
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }
}

impl fmt::Debug for SinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkConfig")
            .field("appenders", &self.appenders)
            .field("base_dir", &self.base_dir)
            .field("router", &"<fn>")
            .finish()
    }
}
