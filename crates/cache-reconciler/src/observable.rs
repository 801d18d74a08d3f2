//! Live query results.

use crate::error::SyncResult;
use crate::record::Record;
use crate::scope::LocalPredicate;
use crate::store::load;
use cache_database::{AsyncDatabase, ChangeSubscription};
use futures_util::stream::{self, Stream};
use std::marker::PhantomData;

/// A scoped query that re-runs whenever its table commits a change.
///
/// Dropping it (or calling [`ObservableQuery::unsubscribe`]) detaches it
/// from the change hub.
pub struct ObservableQuery<R: Record> {
    db: AsyncDatabase,
    predicate: LocalPredicate,
    subscription: ChangeSubscription,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> ObservableQuery<R> {
    pub(crate) fn new(
        db: AsyncDatabase,
        predicate: LocalPredicate,
        subscription: ChangeSubscription,
    ) -> Self {
        Self {
            db,
            predicate,
            subscription,
            _record: PhantomData,
        }
    }

    /// Current result set.
    pub async fn snapshot(&self) -> SyncResult<Vec<R>> {
        load::<R>(&self.db, self.predicate.clone()).await
    }

    /// Wait for the next committed change and return the fresh result set.
    ///
    /// Changes that piled up meanwhile collapse into one snapshot. `None`
    /// once the change hub is gone.
    pub async fn changed(&mut self) -> Option<SyncResult<Vec<R>>> {
        self.subscription.changed().await?;
        self.subscription.drain();
        Some(self.snapshot().await)
    }

    /// Stream of snapshots: the current one first, then one per change.
    pub fn into_stream(self) -> impl Stream<Item = SyncResult<Vec<R>>> + Send {
        stream::unfold((self, true), |(mut query, first)| async move {
            let next = if first {
                query.snapshot().await
            } else {
                query.changed().await?
            };
            Some((next, (query, false)))
        })
    }

    pub fn unsubscribe(self) {
        self.subscription.unsubscribe();
    }
}
