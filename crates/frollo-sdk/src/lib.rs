//! # Frollo SDK
//!
//! Host entry point. Build one [`SdkContext`] at startup and keep it for
//! the lifetime of the app:
//!
//! ```ignore
//! let paths = Paths::new()?;
//! let config = Config::load(&paths)?;
//! init_logging(&config.log_level, &paths)?;
//!
//! let queue = MainThreadQueue::new();
//! let sdk = SdkContext::builder(config, paths)
//!     .access_tokens(tokens)
//!     .callbacks(Arc::new(queue.clone()))
//!     .build()?;
//!
//! sdk.budgets().refresh(BudgetFilter::default(), |result| {
//!     // runs when the host calls queue.drain()
//! });
//! ```

mod callback;
mod context;
mod error;
mod service;

pub use callback::{CallbackContext, InlineContext, Job, MainThreadQueue, RuntimeContext};
pub use context::{SdkContext, SdkContextBuilder};
pub use error::{SdkError, SdkResult};
pub use service::EntityService;

pub use cache_reconciler::{
    DrainOutcome, ObservableQuery, PageOutcome, PageRequest, PaginationInfo, ReconcileOutcome,
    Scope, SyncError, SyncErrorKind,
};
pub use frollo_domain::entities;
pub use remote_fetch_gateway::{AccessTokenProvider, StaticAccessToken};
pub use sdk_config_and_utils::{init_logging, Config, Paths};
