//! Runtime configuration for front ends.
//!
//! # Responsibility
//! - Resolve data directory, database path, log directory and log level.
//!
//! # Invariants
//! - Precedence is explicit override, then environment, then platform default.
//! - Blank environment values are ignored.

use crate::logging::default_log_level;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "PLANBOARD_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "PLANBOARD_LOG_LEVEL";
pub const DB_FILE_NAME: &str = "planboard.sqlite3";
const LOG_SUBDIR: &str = "logs";

/// Values a front end may override explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Resolves against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Self {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves with an injectable environment lookup.
    pub fn resolve_with(overrides: ConfigOverrides, env: impl Fn(&str) -> Option<String>) -> Self {
        let env_value = |key: &str| {
            env(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = overrides
            .data_dir
            .or_else(|| env_value(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);
        let data_dir = absolutize(&data_dir);
        let log_dir = overrides
            .log_dir
            .map(|dir| absolutize(&dir))
            .unwrap_or_else(|| data_dir.join(LOG_SUBDIR));
        let log_level = overrides
            .log_level
            .or_else(|| env_value(LOG_LEVEL_ENV))
            .unwrap_or_else(|| default_log_level().to_string());

        Self {
            data_dir,
            log_dir,
            log_level,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Creates the data directory if needed.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

fn default_data_dir() -> PathBuf {
    ProjectDirs::from("dev", "planboard", "planboard")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("planboard"))
}

// Logging requires absolute paths.
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
