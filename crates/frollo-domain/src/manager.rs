//! Per-entity facade over the cache and the sync engine.

use crate::entities::Entity;
use cache_reconciler::{
    CacheStore, CascadeRules, DrainOutcome, ObservableQuery, PageOutcome, PageRequest,
    PaginationWalker, ReconcileOutcome, Reconciler, SyncResult,
};
use remote_fetch_gateway::FetchGateway;
use std::sync::Arc;
use tracing::debug;

/// Reads, observes and refreshes one entity type.
///
/// The filter passed to a refresh decides both the request sent upstream
/// and the set of cached records checked for staleness.
pub struct EntityManager<E: Entity> {
    store: CacheStore,
    walker: PaginationWalker<E>,
}

impl<E: Entity> Clone for EntityManager<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            walker: self.walker.clone(),
        }
    }
}

impl<E: Entity> EntityManager<E> {
    pub fn new(
        store: CacheStore,
        gateway: Arc<dyn FetchGateway>,
        cascades: Arc<CascadeRules>,
    ) -> Self {
        let reconciler = Reconciler::new(store.clone(), cascades);
        Self {
            store,
            walker: PaginationWalker::new(gateway, reconciler),
        }
    }

    /// Cached records matching `filter`.
    pub async fn fetch(&self, filter: &E::Filter) -> SyncResult<Vec<E>> {
        self.store.fetch(&E::scope(filter)).await
    }

    pub async fn fetch_by_id(&self, id: i64) -> SyncResult<Option<E>> {
        self.store.fetch_by_id(id).await
    }

    /// Live view of the cached records matching `filter`.
    pub fn observe(&self, filter: &E::Filter) -> SyncResult<ObservableQuery<E>> {
        self.store.observe(&E::scope(filter))
    }

    /// Fetch the full collection for `filter` and reconcile it.
    pub async fn refresh(&self, filter: &E::Filter) -> SyncResult<ReconcileOutcome> {
        debug!(table = E::TABLE.name, ?filter, "Refreshing");
        self.walker
            .refresh(&E::endpoint(filter), &E::scope(filter))
            .await
    }

    /// Fetch and reconcile one page.
    pub async fn refresh_with_pagination(
        &self,
        filter: &E::Filter,
        page: PageRequest,
    ) -> SyncResult<PageOutcome> {
        debug!(table = E::TABLE.name, ?filter, after = ?page.after, "Refreshing page");
        self.walker
            .refresh_page(&E::endpoint(filter), &E::scope(filter), page)
            .await
    }

    /// Fetch and reconcile every page.
    pub async fn refresh_all(&self, filter: &E::Filter, page_size: u32) -> SyncResult<DrainOutcome> {
        debug!(table = E::TABLE.name, ?filter, page_size, "Refreshing all pages");
        self.walker
            .refresh_all(&E::endpoint(filter), &E::scope(filter), page_size)
            .await
    }

    /// Remove records from the cache, with their dependents.
    pub async fn delete(&self, ids: Vec<i64>) -> SyncResult<ReconcileOutcome> {
        self.walker.reconciler().delete(ids).await
    }
}
