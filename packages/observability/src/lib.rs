//! # Observability
//!
//! Logging setup shared by every Frollo SDK crate.
//!
//! Library crates only emit events through the `tracing` macros. The host
//! application calls [`init_with_config`] once at startup and decides where
//! the events go:
//!
//! - a JSONL file (one structured object per line) when `log_path` is set
//! - a compact human-readable stderr stream when `also_stderr` is set, or
//!   when no file is configured at all
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "frollo-sdk".into(),
//!     default_level: "debug".into(),
//!     log_path: Some(paths.sdk_log_file()),
//!     also_stderr: true,
//! })?;
//! tracing::info!("sdk ready");
//! ```

mod file_writer;
mod json_layer;

pub use file_writer::{FileLogWriter, WriterFactory};
pub use json_layer::{JsonLayer, LogEntry};

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name written into every JSONL entry (e.g. "frollo-sdk", "host-app").
    pub service_name: String,

    /// Default filter directive. `RUST_LOG` takes precedence when set.
    pub default_level: String,

    /// JSONL output file. Stderr-only logging when `None`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "frollo-sdk".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with default settings for the given service.
pub fn init(service_name: &str) -> io::Result<()> {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Initialize logging with custom configuration.
///
/// Returns an error only when the log file cannot be opened. Installing a
/// second global subscriber is a no-op, so calling this twice is harmless.
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.default_level))
    };

    let json_layer = match &config.log_path {
        Some(path) => {
            let writer = FileLogWriter::new(path)?;
            Some(
                JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
                    .with_filter(env_filter()),
            )
        }
        None => None,
    };

    let stderr_layer = if config.also_stderr || config.log_path.is_none() {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .compact()
                .with_writer(io::stderr)
                .with_filter(env_filter()),
        )
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            service = %config.service_name,
            log_path = ?config.log_path,
            "observability initialized"
        );
    }
    Ok(())
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

pub use tracing::{debug, error, info, instrument, trace, warn, Level};
