//! Registry mapping destination names to their appenders

use crate::appenders::file::FileAppender;
use crate::core::config::AppenderConfig;
use crate::core::error::{Result, SinkError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;

/// Immutable mapping from destination name to [`FileAppender`], built fresh
/// on every configuration (re)load.
///
/// Each appender sits behind its own mutex. The consumer thread is the only
/// writer during normal operation; the mutex serializes the two exceptional
/// paths against it: synchronous writes from caller threads after shutdown,
/// and the close-before-swap barrier during reload.
#[derive(Debug)]
pub struct AppenderRegistry {
    appenders: HashMap<String, Mutex<FileAppender>>,
}

impl AppenderRegistry {
    /// Build appenders for every configured destination.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate destination name or when any appender cannot be
    /// constructed (unreachable parent directory, unopenable file).
    pub fn build(configs: &[AppenderConfig], base_dir: Option<&Path>) -> Result<Self> {
        let mut appenders = HashMap::with_capacity(configs.len());
        for config in configs {
            if appenders.contains_key(&config.name) {
                return Err(SinkError::config(
                    "registry",
                    format!("duplicate destination name '{}'", config.name),
                ));
            }
            let appender = FileAppender::new(config.clone(), base_dir)?;
            appenders.insert(config.name.clone(), Mutex::new(appender));
        }
        Ok(Self { appenders })
    }

    /// Look up the appender for a destination name
    pub fn get(&self, name: &str) -> Option<&Mutex<FileAppender>> {
        self.appenders.get(name)
    }

    /// Number of destinations
    #[must_use]
    pub fn len(&self) -> usize {
        self.appenders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.appenders.is_empty()
    }

    /// Flush and close every appender, swallowing per-appender failures so
    /// one bad destination never blocks releasing the others.
    pub fn close_all(&self) {
        for (name, appender) in &self.appenders {
            if let Err(e) = appender.lock().close() {
                eprintln!("[SINK WARNING] Failed to close appender '{name}': {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_build_and_lookup() {
        let dir = tempdir().unwrap();
        let configs = vec![
            AppenderConfig::new("app", "app.log"),
            AppenderConfig::new("audit", "audit.log"),
        ];
        let registry = AppenderRegistry::build(&configs, Some(dir.path())).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("app").is_some());
        assert!(registry.get("audit").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let dir = tempdir().unwrap();
        let configs = vec![
            AppenderConfig::new("app", "a.log"),
            AppenderConfig::new("app", "b.log"),
        ];
        let err = AppenderRegistry::build(&configs, Some(dir.path())).unwrap_err();
        assert!(matches!(err, SinkError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_close_all_flushes() {
        let dir = tempdir().unwrap();
        let configs = vec![AppenderConfig::new("app", "app.log").with_max_file_size(1 << 20)];
        let registry = AppenderRegistry::build(&configs, Some(dir.path())).unwrap();

        let ts = chrono::Local::now();
        // Two writes with one timestamp: the second stays buffered until close
        registry.get("app").unwrap().lock().try_write(ts, "a\n").unwrap();
        registry.get("app").unwrap().lock().try_write(ts, "b\n").unwrap();
        registry.close_all();

        let content = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
        assert_eq!(content, "a\nb\n");
    }
}
