//! # Cache reconciler
//!
//! The refresh-and-reconcile core of the SDK cache.
//!
//! A refresh fetches records through a [`FetchGateway`], then a
//! [`Reconciler`] merges them into the cache in one transaction:
//!
//! 1. upsert every fetched record by id (full replace)
//! 2. collect cached ids matching the same [`Scope`] that was sent upstream,
//!    limited to the page's [`PageBounds`] when paginating
//! 3. delete the ids that were not fetched
//! 4. apply the registered [`CascadeRules`] to the deleted ids
//!
//! [`PaginationWalker`] drives passes over one page or all pages, and
//! [`ObservableQuery`] re-reads a scoped result set after each commit.
//!
//! [`FetchGateway`]: remote_fetch_gateway::FetchGateway

mod cascade;
mod error;
mod observable;
mod reconciler;
mod record;
mod scope;
pub mod store;
mod walker;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use cascade::{CascadeCount, CascadeLink, CascadeRules};
pub use error::{SyncError, SyncErrorKind, SyncResult};
pub use observable::ObservableQuery;
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use record::{decode_record, PreparedRow, Record};
pub use scope::{Condition, LocalPredicate, Op, PageBounds, Scope, ScopeValue};
pub use store::CacheStore;
pub use walker::{DrainOutcome, PageOutcome, PageRequest, PaginationInfo, PaginationWalker};
