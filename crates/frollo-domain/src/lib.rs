//! # Frollo domain
//!
//! The entities the SDK caches, how each one is filtered and fetched, and
//! the cascade links between their tables. [`EntityManager`] binds one
//! entity type to the cache and the sync engine.

pub mod entities;
mod cascades;
mod manager;
mod wire;

#[cfg(test)]
mod tests;

pub use cascades::frollo_cascade_rules;
pub use entities::Entity;
pub use manager::EntityManager;
