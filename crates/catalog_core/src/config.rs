//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Decide where the catalog database and log files live.
//! - Pick the log level for the current build mode.
//!
//! # Invariants
//! - Blank or missing variables fall back to defaults; resolution never fails.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CATALOG_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CATALOG_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CATALOG_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "catalog.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "catalog-logs";

/// Resolved settings for one catalog process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl CatalogConfig {
    /// Reads `CATALOG_DB_PATH`, `CATALOG_LOG_LEVEL` and `CATALOG_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
        }
    }
}
