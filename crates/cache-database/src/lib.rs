//! SQLite storage engine for the Frollo SDK cache.
//!
//! This crate provides:
//! - [`AsyncDatabase`]: every statement runs on one dedicated thread, in FIFO
//!   order, so callers on the async worker pool never block on SQLite
//! - Schema migrations for every cached entity table
//! - [`ChangeHub`]: per-table change notifications that back observable queries
//!
//! ```ignore
//! let db = AsyncDatabase::open(&paths.database_file()).await?;
//! let count = db
//!     .transaction(|tx| {
//!         tx.execute("DELETE FROM budgets WHERE id = ?1", [7])?;
//!         Ok(tx.changes())
//!     })
//!     .await?;
//! ```
//!
//! **Important**: only SQL belongs inside `call()` / `transaction()`.
//! Network calls and JSON decoding of remote payloads happen outside.

mod change_hub;
mod error;
mod executor;
mod migrations;
pub mod tables;

pub use change_hub::{ChangeHub, ChangeSubscription, TableChange};
pub use error::{DatabaseError, DatabaseResult};
pub use executor::AsyncDatabase;
pub use migrations::{run_migrations, CURRENT_VERSION};
