//! Runtime settings resolved from the environment.
//!
//! # Responsibility
//! - Name the database file and logging settings for binaries embedding the
//!   access layer.
//!
//! # Invariants
//! - Every setting has a default; an unset environment is a valid config.
//! - Log levels are validated here so `init_logging` never sees a bad level.

use crate::logging::{default_log_level, normalize_level, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "MEDIATEK_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "MEDIATEK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "MEDIATEK_LOG_DIR";

const DEFAULT_DB_PATH: &str = "mediatek.db";

#[derive(Debug)]
pub enum ConfigError {
    InvalidLogLevel(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(err) => write!(f, "{LOG_LEVEL_VAR}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(err) => Some(err),
        }
    }
}

/// Settings for opening the catalog database and its logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    pub database_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AccessConfig {
    /// Reads `MEDIATEK_DB_PATH`, `MEDIATEK_LOG_LEVEL` and `MEDIATEK_LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let log_level = match read(LOG_LEVEL_VAR) {
            Some(level) => normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?,
            None => defaults.log_level,
        };

        Ok(Self {
            database_path: read(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level,
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        })
    }
}
