//! Configuration, file-system layout, and logging setup for the Frollo SDK.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_API_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_PAGE_SIZE};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, init_logging_for_service};
pub use paths::Paths;
