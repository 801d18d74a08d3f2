//! Scoped upsert plus stale deletion, in one transaction per pass.

use crate::cascade::{CascadeCount, CascadeRules};
use crate::error::SyncResult;
use crate::record::{PreparedRow, Record};
use crate::scope::{PageBounds, Scope};
use crate::store::{delete_many, query_ids_by_scope, upsert_many, CacheStore};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// What one committed pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub upserted: usize,
    /// Stale (or explicitly deleted) ids of the reconciled table, ascending.
    pub deleted: Vec<i64>,
    pub cascaded: Vec<CascadeCount>,
}

impl ReconcileOutcome {
    /// Fold another pass into this one.
    pub fn absorb(&mut self, other: ReconcileOutcome) {
        self.upserted += other.upserted;
        self.deleted.extend(other.deleted);
        for (table, count) in other.cascaded {
            match self.cascaded.iter_mut().find(|(name, _)| *name == table) {
                Some((_, total)) => *total += count,
                None => self.cascaded.push((table, count)),
            }
        }
    }

    fn touched_tables(&self, table: &'static str) -> Vec<&'static str> {
        let mut tables = Vec::new();
        if self.upserted > 0 || !self.deleted.is_empty() {
            tables.push(table);
        }
        tables.extend(
            self.cascaded
                .iter()
                .filter(|(_, count)| *count > 0)
                .map(|(name, _)| *name),
        );
        tables
    }
}

/// Merges fetched records of type `R` into the cache.
///
/// Every pass is one immediate transaction: upsert, stale computation,
/// stale deletion and cascades commit together or not at all. Observers are
/// notified only after the commit.
pub struct Reconciler<R: Record> {
    store: CacheStore,
    cascades: Arc<CascadeRules>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for Reconciler<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cascades: Arc::clone(&self.cascades),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Reconciler<R> {
    pub fn new(store: CacheStore, cascades: Arc<CascadeRules>) -> Self {
        Self {
            store,
            cascades,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Reconcile a complete fetch against `scope`. An empty `fetched`
    /// deletes everything in scope.
    pub async fn reconcile(&self, fetched: Vec<R>, scope: &Scope) -> SyncResult<ReconcileOutcome> {
        self.reconcile_page(fetched, scope, PageBounds::unbounded())
            .await
    }

    /// Reconcile one page: stale candidates are limited to `scope` within
    /// `bounds`.
    pub async fn reconcile_page(
        &self,
        fetched: Vec<R>,
        scope: &Scope,
        bounds: PageBounds,
    ) -> SyncResult<ReconcileOutcome> {
        let table = R::TABLE;
        let predicate = scope.to_local_predicate(&table)?.within(bounds);
        let rows = fetched
            .iter()
            .map(PreparedRow::from_record)
            .collect::<SyncResult<Vec<_>>>()?;
        let cascades = Arc::clone(&self.cascades);

        let outcome = self
            .store
            .db()
            .transaction(move |tx| {
                let upserted = upsert_many(tx, &table, &rows)?;

                let fetched_ids: HashSet<i64> = rows.iter().map(|row| row.id).collect();
                let stale: Vec<i64> = query_ids_by_scope(tx, &table, &predicate)?
                    .into_iter()
                    .filter(|id| !fetched_ids.contains(id))
                    .collect();

                delete_many(tx, table.name, &stale)?;
                let cascaded = cascades.on_deleted(tx, table.name, &stale)?;

                Ok(ReconcileOutcome {
                    upserted,
                    deleted: stale,
                    cascaded,
                })
            })
            .await?;

        self.publish(&outcome);
        info!(
            table = table.name,
            upserted = outcome.upserted,
            deleted = outcome.deleted.len(),
            cascaded = ?outcome.cascaded,
            before = ?bounds.before,
            after = ?bounds.after,
            "Reconciled"
        );
        Ok(outcome)
    }

    /// Delete records by id, cascading to their dependents.
    pub async fn delete(&self, ids: Vec<i64>) -> SyncResult<ReconcileOutcome> {
        let table = R::TABLE;
        let cascades = Arc::clone(&self.cascades);

        let outcome = self
            .store
            .db()
            .transaction(move |tx| {
                let existing: Vec<i64> = {
                    let mut unique = ids;
                    unique.sort_unstable();
                    unique.dedup();
                    crate::store::ids_where_in(tx, table.name, "id", &unique)?
                };
                delete_many(tx, table.name, &existing)?;
                let cascaded = cascades.on_deleted(tx, table.name, &existing)?;
                Ok(ReconcileOutcome {
                    upserted: 0,
                    deleted: existing,
                    cascaded,
                })
            })
            .await?;

        self.publish(&outcome);
        debug!(
            table = table.name,
            deleted = ?outcome.deleted,
            cascaded = ?outcome.cascaded,
            "Deleted"
        );
        Ok(outcome)
    }

    fn publish(&self, outcome: &ReconcileOutcome) {
        let touched = outcome.touched_tables(R::TABLE.name);
        if !touched.is_empty() {
            self.store.hub().notify(&touched);
        }
    }
}
