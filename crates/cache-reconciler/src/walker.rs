//! Drives reconciliation passes across remote pages.
//!
//! ```text
//! START -> FETCHING(after = None) -> more pages ? FETCHING(after = cursor) : DONE
//!                 \-> error -> FAILED
//! ```
//!
//! Every page is fetched, decoded and reconciled before the next request
//! goes out, so a drain that fails or is dropped halfway leaves the pages it
//! already committed in place.

use crate::error::SyncResult;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::record::{decode_record, Record};
use crate::scope::{PageBounds, Scope};
use remote_fetch_gateway::{FetchGateway, FetchRequest, PagedResponse};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cursor and size for one page request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<i64>,
    pub before: Option<i64>,
    pub size: Option<u32>,
}

impl PageRequest {
    pub fn first(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn after(cursor: i64, size: u32) -> Self {
        Self {
            after: Some(cursor),
            before: None,
            size: Some(size),
        }
    }
}

/// Pagination state reported back to the caller after one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationInfo {
    pub before: Option<i64>,
    pub after: Option<i64>,
    pub total: Option<u64>,
    pub fetched: usize,
}

/// Result of one single-page pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    pub info: PaginationInfo,
    pub outcome: ReconcileOutcome,
    /// No page follows this one.
    pub last: bool,
}

/// Result of a drain-all pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainOutcome {
    pub pages: usize,
    pub fetched: usize,
    pub total: Option<u64>,
    pub outcome: ReconcileOutcome,
}

/// Fetches pages of `R` through a gateway and reconciles each one.
pub struct PaginationWalker<R: Record> {
    gateway: Arc<dyn FetchGateway>,
    reconciler: Reconciler<R>,
}

impl<R: Record> Clone for PaginationWalker<R> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            reconciler: self.reconciler.clone(),
        }
    }
}

impl<R: Record> PaginationWalker<R> {
    pub fn new(gateway: Arc<dyn FetchGateway>, reconciler: Reconciler<R>) -> Self {
        Self {
            gateway,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<R> {
        &self.reconciler
    }

    /// Fetch the whole unpaginated collection and reconcile it against the
    /// unbounded scope.
    pub async fn refresh(&self, endpoint: &str, scope: &Scope) -> SyncResult<ReconcileOutcome> {
        scope.validate()?;
        let request = FetchRequest::new(endpoint).with_params(scope.to_remote_query_params());
        let response = self.gateway.fetch(request).await?;
        let records = decode_page::<R>(response.records)?;
        self.reconciler.reconcile(records, scope).await
    }

    /// Fetch one page and reconcile it against `scope` limited to the id
    /// range the page covers.
    pub async fn refresh_page(
        &self,
        endpoint: &str,
        scope: &Scope,
        page: PageRequest,
    ) -> SyncResult<PageOutcome> {
        scope.validate()?;
        let request = FetchRequest::new(endpoint)
            .with_params(scope.to_remote_query_params())
            .with_after(page.after)
            .with_before(page.before)
            .with_size(page.size);
        let response = self.gateway.fetch(request).await?;

        let last = is_last_page(&response, page.size);
        let bounds = PageBounds {
            before: response.paging.before.or(page.after),
            after: if last { None } else { response.paging.after },
        };
        let info = PaginationInfo {
            before: response.paging.before,
            after: response.paging.after,
            total: response.paging.total,
            fetched: response.records.len(),
        };

        let records = decode_page::<R>(response.records)?;
        let outcome = self
            .reconciler
            .reconcile_page(records, scope, bounds)
            .await?;

        debug!(
            table = R::TABLE.name,
            endpoint,
            fetched = info.fetched,
            after = ?info.after,
            last,
            "Page reconciled"
        );
        Ok(PageOutcome {
            info,
            outcome,
            last,
        })
    }

    /// Walk every page from the start, reconciling each before requesting
    /// the next. Stops at the first error.
    pub async fn refresh_all(
        &self,
        endpoint: &str,
        scope: &Scope,
        page_size: u32,
    ) -> SyncResult<DrainOutcome> {
        let mut drained = DrainOutcome::default();
        let mut requested: HashSet<Option<i64>> = HashSet::new();
        let mut cursor: Option<i64> = None;

        loop {
            if !requested.insert(cursor) {
                warn!(
                    table = R::TABLE.name,
                    endpoint,
                    cursor = ?cursor,
                    "Server repeated a cursor, stopping pagination"
                );
                break;
            }

            let page = PageRequest {
                after: cursor,
                before: None,
                size: Some(page_size),
            };
            let result = self.refresh_page(endpoint, scope, page).await?;

            drained.pages += 1;
            drained.fetched += result.info.fetched;
            drained.total = result.info.total.or(drained.total);
            drained.outcome.absorb(result.outcome);

            match result.info.after {
                Some(next) if !result.last => cursor = Some(next),
                _ => break,
            }
        }

        debug!(
            table = R::TABLE.name,
            endpoint,
            pages = drained.pages,
            fetched = drained.fetched,
            "Pagination drained"
        );
        Ok(drained)
    }
}

fn is_last_page(response: &PagedResponse, size: Option<u32>) -> bool {
    let short = size.is_some_and(|size| response.records.len() < size as usize);
    response.paging.after.is_none() || short
}

fn decode_page<R: Record>(records: Vec<serde_json::Value>) -> SyncResult<Vec<R>> {
    records.into_iter().map(decode_record::<R>).collect()
}
