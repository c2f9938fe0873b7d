//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never fails; invalid log levels surface later in
//!   [`crate::logging::init_logging`].

use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "USERBOOK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "USERBOOK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "USERBOOK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "userbook.sqlite3";

/// Logger settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// One of `trace|debug|info|warn|error`, case-insensitive.
    pub level: String,
    /// Rolling log file directory; `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Top-level configuration for core consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log: LogSettings,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log: LogSettings {
                level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
                log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
            },
        }
    }
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

#[cfg(test)]
mod tests {
    use super::{default_log_level, CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = CoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.db_path, std::env::temp_dir().join("userbook.sqlite3"));
        assert_eq!(config.log.level, default_log_level());
        assert!(config.log.log_dir.is_none());
    }

    #[test]
    fn explicit_values_are_trimmed_and_used() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /data/userbook.db "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/userbook"),
        ]));
        assert_eq!(config.db_path, PathBuf::from("/data/userbook.db"));
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.log_dir, Some(PathBuf::from("/var/log/userbook")));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = CoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "   "), (LOG_DIR_ENV, "")]));
        assert_eq!(config.db_path, std::env::temp_dir().join("userbook.sqlite3"));
        assert!(config.log.log_dir.is_none());
    }
}
