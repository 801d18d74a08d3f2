//! Logging initialization for the SDK.
//!
//! Thin wrapper over the observability package: structured JSONL goes to
//! [`Paths::sdk_log_file`], and the level comes from `RUST_LOG` or the
//! configured default.

use crate::{CoreResult, Paths};
use observability::LogConfig;

/// Initialize logging under the default "frollo-sdk" service name.
///
/// # Example
///
/// ```ignore
/// let paths = Paths::new()?;
/// let config = Config::load(&paths)?;
/// init_logging(&config.log_level, &paths)?;
/// tracing::info!("sdk started");
/// ```
pub fn init_logging(level: &str, paths: &Paths) -> CoreResult<()> {
    init_logging_for_service("frollo-sdk", level, paths)
}

/// Initialize logging with a custom service name, e.g. to tell the host
/// application's own events apart from the SDK's in one log stream.
pub fn init_logging_for_service(service_name: &str, level: &str, paths: &Paths) -> CoreResult<()> {
    paths.ensure_dirs()?;
    observability::init_with_config(LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path: Some(paths.sdk_log_file()),
        also_stderr: std::env::var("FROLLO_LOG_STDERR").is_ok(),
    })?;
    Ok(())
}
