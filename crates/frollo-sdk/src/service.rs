//! Host-facing API for one entity type.

use crate::callback::CallbackContext;
use crate::error::{SdkError, SdkResult};
use cache_reconciler::{
    DrainOutcome, ObservableQuery, PageOutcome, PageRequest, ReconcileOutcome, SyncResult,
};
use frollo_domain::{Entity, EntityManager};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::warn;

/// Refresh, fetch and delete for entity `E`.
///
/// Callback variants run on the SDK worker pool and hand their result to
/// the context's [`CallbackContext`]. The `_async` variants run on the same
/// pool and can be awaited from any executor.
pub struct EntityService<E: Entity> {
    manager: EntityManager<E>,
    workers: Handle,
    callbacks: Arc<dyn CallbackContext>,
    default_page_size: u32,
}

impl<E: Entity> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            workers: self.workers.clone(),
            callbacks: Arc::clone(&self.callbacks),
            default_page_size: self.default_page_size,
        }
    }
}

impl<E: Entity> EntityService<E> {
    pub(crate) fn new(
        manager: EntityManager<E>,
        workers: Handle,
        callbacks: Arc<dyn CallbackContext>,
        default_page_size: u32,
    ) -> Self {
        Self {
            manager,
            workers,
            callbacks,
            default_page_size,
        }
    }

    pub fn manager(&self) -> &EntityManager<E> {
        &self.manager
    }

    /// Live view of the cached records matching `filter`.
    pub fn fetch(&self, filter: &E::Filter) -> SdkResult<ObservableQuery<E>> {
        Ok(self.manager.observe(filter)?)
    }

    pub fn refresh<F>(&self, filter: E::Filter, completion: F)
    where
        F: FnOnce(SdkResult<ReconcileOutcome>) + Send + 'static,
    {
        let manager = self.manager.clone();
        self.run(async move { manager.refresh(&filter).await }, completion);
    }

    pub fn refresh_with_pagination<F>(&self, filter: E::Filter, page: PageRequest, completion: F)
    where
        F: FnOnce(SdkResult<PageOutcome>) + Send + 'static,
    {
        let manager = self.manager.clone();
        self.run(
            async move { manager.refresh_with_pagination(&filter, page).await },
            completion,
        );
    }

    /// Drain every page. `page_size` falls back to the configured default.
    pub fn refresh_all<F>(&self, filter: E::Filter, page_size: Option<u32>, completion: F)
    where
        F: FnOnce(SdkResult<DrainOutcome>) + Send + 'static,
    {
        let manager = self.manager.clone();
        let page_size = page_size.unwrap_or(self.default_page_size);
        self.run(
            async move { manager.refresh_all(&filter, page_size).await },
            completion,
        );
    }

    pub fn delete<F>(&self, ids: Vec<i64>, completion: F)
    where
        F: FnOnce(SdkResult<ReconcileOutcome>) + Send + 'static,
    {
        let manager = self.manager.clone();
        self.run(async move { manager.delete(ids).await }, completion);
    }

    pub async fn refresh_async(&self, filter: E::Filter) -> SdkResult<ReconcileOutcome> {
        let manager = self.manager.clone();
        self.on_workers(async move { manager.refresh(&filter).await })
            .await
    }

    pub async fn refresh_with_pagination_async(
        &self,
        filter: E::Filter,
        page: PageRequest,
    ) -> SdkResult<PageOutcome> {
        let manager = self.manager.clone();
        self.on_workers(async move { manager.refresh_with_pagination(&filter, page).await })
            .await
    }

    pub async fn refresh_all_async(
        &self,
        filter: E::Filter,
        page_size: Option<u32>,
    ) -> SdkResult<DrainOutcome> {
        let manager = self.manager.clone();
        let page_size = page_size.unwrap_or(self.default_page_size);
        self.on_workers(async move { manager.refresh_all(&filter, page_size).await })
            .await
    }

    pub async fn delete_async(&self, ids: Vec<i64>) -> SdkResult<ReconcileOutcome> {
        let manager = self.manager.clone();
        self.on_workers(async move { manager.delete(ids).await })
            .await
    }

    fn run<T, Fut, F>(&self, work: Fut, completion: F)
    where
        T: Send + 'static,
        Fut: Future<Output = SyncResult<T>> + Send + 'static,
        F: FnOnce(SdkResult<T>) + Send + 'static,
    {
        let callbacks = Arc::clone(&self.callbacks);
        self.workers.spawn(async move {
            let result = work.await.map_err(SdkError::from);
            if let Err(err) = &result {
                warn!(table = E::TABLE.name, error = %err, "Refresh failed");
            }
            callbacks.dispatch(Box::new(move || completion(result)));
        });
    }

    async fn on_workers<T, Fut>(&self, work: Fut) -> SdkResult<T>
    where
        T: Send + 'static,
        Fut: Future<Output = SyncResult<T>> + Send + 'static,
    {
        let result = self
            .workers
            .spawn(work)
            .await
            .map_err(|err| SdkError::Runtime(format!("worker task failed: {}", err)))?;
        Ok(result?)
    }
}
