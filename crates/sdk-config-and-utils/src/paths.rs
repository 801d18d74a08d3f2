//! File system layout for the SDK's on-device state.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

const BASE_DIR_NAME: &str = ".frollo";
const DATABASE_FILE_NAME: &str = "cache.sqlite3";

/// Resolves every file the SDK reads or writes.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory (~/.frollo unless overridden by the host)
    base_dir: PathBuf,
}

impl Paths {
    /// Uses `~/.frollo` as the base directory.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(BASE_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    ///
    /// Mobile hosts pass their sandboxed data directory here.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.frollo/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the local cache database path (~/.frollo/cache.sqlite3).
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join(DATABASE_FILE_NAME)
    }

    /// Get the logs directory (~/.frollo/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the structured log file path (~/.frollo/logs/sdk.jsonl).
    pub fn sdk_log_file(&self) -> PathBuf {
        self.logs_dir().join("sdk.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
