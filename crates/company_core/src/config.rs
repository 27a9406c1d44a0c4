//! Process-level settings: where the store lives and how to log.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - Without an explicit path the store is a private in-memory database.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{self, LoggingError};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "COMPANY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "COMPANY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "COMPANY_LOG_DIR";

/// Where the records store lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    #[default]
    Memory,
}

/// Settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub database: DatabaseLocation,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Database(DbError),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(err) => write!(f, "database: {err}"),
            Self::Logging(err) => write!(f, "logging: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Database(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::Memory,
            log_level: logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `COMPANY_DB_PATH`, `COMPANY_LOG_LEVEL` and `COMPANY_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or blank keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = value(ENV_DB_PATH) {
            config.database = DatabaseLocation::File(PathBuf::from(path));
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = value(ENV_LOG_DIR).map(PathBuf::from);
        config
    }

    /// Opens and migrates the configured store.
    pub fn open_database(&self) -> Result<Connection, ConfigError> {
        let conn = match &self.database {
            DatabaseLocation::File(path) => open_db(path)?,
            DatabaseLocation::Memory => open_db_in_memory()?,
        };
        Ok(conn)
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is left off.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        match &self.log_dir {
            Some(dir) => {
                logging::init_logging(&self.log_level, dir)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DatabaseLocation, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::db::migrations::{current_user_version, latest_version};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_in_memory_defaults() {
        let config = CoreConfig::from_lookup(|_| None);
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.database, DatabaseLocation::Memory);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn lookup_values_are_trimmed_and_blank_ones_ignored() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /var/lib/company.sqlite3 "),
            (ENV_LOG_LEVEL, "   "),
            (ENV_LOG_DIR, "/var/log/company"),
        ]));

        assert_eq!(
            config.database,
            DatabaseLocation::File(PathBuf::from("/var/lib/company.sqlite3"))
        );
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/company")));
    }

    #[test]
    fn open_database_migrates_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company.sqlite3");
        let config = CoreConfig {
            database: DatabaseLocation::File(path.clone()),
            ..CoreConfig::default()
        };

        let conn = config.open_database().unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), latest_version());
        assert!(path.exists());
    }

    #[test]
    fn init_logging_without_directory_is_a_no_op() {
        assert!(!CoreConfig::default().init_logging().unwrap());
    }
}
