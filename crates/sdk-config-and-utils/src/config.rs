//! SDK configuration.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default API base URL (can be overridden at compile time via FROLLO_API_URL env var).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("FROLLO_API_URL") {
    Some(url) => url,
    None => "https://api.frollo.us/api/v2",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Page size used by paginated refreshes when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WORKER_THREADS: usize = 2;
const MAX_PAGE_SIZE: u32 = 500;

/// SDK configuration, persisted as JSON at [`Paths::config_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL every gateway endpoint is resolved against.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout enforced by the HTTP client.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Page size for paginated refreshes.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Threads in the background worker pool running refreshes.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_worker_threads() -> usize {
    DEFAULT_WORKER_THREADS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_page_size: DEFAULT_PAGE_SIZE,
            worker_threads: DEFAULT_WORKER_THREADS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides and validate.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("FROLLO_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(api_url) = std::env::var("FROLLO_API_URL") {
            if !api_url.trim().is_empty() {
                self.api_base_url = api_url.trim().to_string();
            }
        }
    }

    /// Reject values the SDK cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        self.api_base_url()?;
        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(CoreError::InvalidValue {
                field: "default_page_size",
                reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::InvalidValue {
                field: "request_timeout_secs",
                reason: "must be positive".to_string(),
            });
        }
        if self.worker_threads == 0 {
            return Err(CoreError::InvalidValue {
                field: "worker_threads",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Get the API base URL as a parsed URL.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }

    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "log_level": "debug", "default_page_size": 50 }"#)
            .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.worker_threads, DEFAULT_WORKER_THREADS);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            request_timeout_secs: 5,
            worker_threads: 4,
            ..Config::default()
        };
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config = Config {
            default_page_size: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidValue {
                field: "default_page_size",
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            api_base_url: "not a valid url".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidUrl(_))));
    }

    #[test]
    fn test_request_timeout_duration() {
        let config = Config {
            request_timeout_secs: 12,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(12));
    }
}
