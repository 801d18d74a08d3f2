//! Reconciliation behaviour tests.
//!
//! - `reconcile.rs`  - idempotence, stale deletion, scope isolation, cascades, atomicity
//! - `pagination.rs` - single-page and drain-all walks over a scripted gateway
//! - `live.rs`       - observable queries and change notification
//! - `symmetry.rs`   - remote and local renderings of a scope select the same ids

mod reconcile;

use crate::cascade::{CascadeLink, CascadeRules};
use crate::record::{PreparedRow, Record};
use crate::reconciler::Reconciler;
use crate::scope::Scope;
use crate::store::{upsert_many, CacheStore};
use cache_database::tables::{BUDGETS, BUDGET_PERIODS};
use std::sync::Arc;

pub(crate) fn budget_cascades() -> Arc<CascadeRules> {
    Arc::new(
        CascadeRules::new()
            .with(CascadeLink::new(BUDGETS, BUDGET_PERIODS, "budget_id"))
            .unwrap(),
    )
}

/// Write records straight into the cache, bypassing stale deletion.
pub(crate) async fn seed<R: Record>(store: &CacheStore, records: &[R]) {
    let rows: Vec<PreparedRow> = records
        .iter()
        .map(|record| PreparedRow::from_record(record).unwrap())
        .collect();
    store
        .db()
        .transaction(move |tx| upsert_many(tx, &R::TABLE, &rows))
        .await
        .unwrap();
}

pub(crate) async fn ids<R: Record>(store: &CacheStore, scope: &Scope) -> Vec<i64> {
    store.ids::<R>(scope).await.unwrap()
}

pub(crate) fn reconciler<R: Record>(store: &CacheStore) -> Reconciler<R> {
    Reconciler::new(store.clone(), budget_cascades())
}
