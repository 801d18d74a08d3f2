//! Table change notifications.
//!
//! Observers subscribe to the tables a query reads. After a transaction
//! commits, the writer calls [`ChangeHub::notify`] with every table it
//! touched. Rolled-back transactions notify nothing.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A committed mutation of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChange {
    pub table: &'static str,
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: RwLock<HashMap<&'static str, Vec<(u64, UnboundedSender<TableChange>)>>>,
}

/// Fan-out of table change notifications. Cloning shares the same hub.
#[derive(Debug, Clone, Default)]
pub struct ChangeHub {
    inner: Arc<HubInner>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes on `tables`.
    ///
    /// Only changes committed after this call are delivered. Dropping the
    /// returned subscription unsubscribes it.
    pub fn subscribe(&self, tables: &[&'static str]) -> ChangeSubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut subscribers = self.inner.subscribers.write();
        for table in tables {
            subscribers
                .entry(*table)
                .or_default()
                .push((id, sender.clone()));
        }

        ChangeSubscription {
            id,
            tables: tables.to_vec(),
            receiver,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Broadcast one change per table to its subscribers.
    ///
    /// Must be called after the commit. Subscribers whose receiver is gone
    /// are pruned on the way.
    pub fn notify(&self, tables: &[&'static str]) {
        let mut subscribers = self.inner.subscribers.write();
        for table in tables {
            if let Some(senders) = subscribers.get_mut(table) {
                senders.retain(|(_, sender)| sender.send(TableChange { table: *table }).is_ok());
            }
        }
    }

    /// Number of live subscriptions on `table`.
    pub fn subscriber_count(&self, table: &str) -> usize {
        self.inner
            .subscribers
            .read()
            .get(table)
            .map(|senders| senders.len())
            .unwrap_or(0)
    }
}

impl HubInner {
    fn remove(&self, id: u64, tables: &[&'static str]) {
        let mut subscribers = self.subscribers.write();
        for table in tables {
            if let Some(senders) = subscribers.get_mut(table) {
                senders.retain(|(sender_id, _)| *sender_id != id);
            }
        }
    }
}

/// Receiving end of a [`ChangeHub::subscribe`] call.
#[derive(Debug)]
pub struct ChangeSubscription {
    id: u64,
    tables: Vec<&'static str>,
    receiver: UnboundedReceiver<TableChange>,
    hub: Weak<HubInner>,
}

impl ChangeSubscription {
    /// Wait for the next change. `None` once the hub is gone.
    pub async fn changed(&mut self) -> Option<TableChange> {
        self.receiver.recv().await
    }

    /// Next change if one is already queued.
    pub fn try_changed(&mut self) -> Option<TableChange> {
        self.receiver.try_recv().ok()
    }

    /// Discard every queued notification, returning how many there were.
    ///
    /// Observers re-read the whole query anyway, so a burst of commits only
    /// needs one refresh.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while self.receiver.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }

    pub fn tables(&self) -> &[&'static str] {
        &self.tables
    }

    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id, &self.tables);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_and_receive() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe(&["budgets"]);
        assert_eq!(hub.subscriber_count("budgets"), 1);

        hub.notify(&["budgets"]);

        assert_eq!(sub.try_changed(), Some(TableChange { table: "budgets" }));
        assert_eq!(sub.try_changed(), None);
    }

    #[test]
    fn subscription_sees_only_its_tables() {
        let hub = ChangeHub::new();
        let mut budgets = hub.subscribe(&["budgets", "budget_periods"]);
        let mut messages = hub.subscribe(&["messages"]);

        hub.notify(&["budget_periods"]);

        assert_eq!(
            budgets.try_changed(),
            Some(TableChange {
                table: "budget_periods"
            })
        );
        assert!(messages.try_changed().is_none());
    }

    #[test]
    fn no_change_before_subscribe() {
        let hub = ChangeHub::new();
        hub.notify(&["accounts"]);

        let mut sub = hub.subscribe(&["accounts"]);
        assert!(sub.try_changed().is_none());
    }

    #[test]
    fn drop_unsubscribes() {
        let hub = ChangeHub::new();
        let sub = hub.subscribe(&["consents", "providers"]);
        let _other = hub.subscribe(&["consents"]);
        assert_eq!(hub.subscriber_count("consents"), 2);

        sub.unsubscribe();

        assert_eq!(hub.subscriber_count("consents"), 1);
        assert_eq!(hub.subscriber_count("providers"), 0);
    }

    #[test]
    fn drain_coalesces_bursts() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe(&["messages"]);

        hub.notify(&["messages"]);
        hub.notify(&["messages"]);
        hub.notify(&["messages"]);

        assert_eq!(sub.drain(), 3);
        assert!(sub.try_changed().is_none());
    }

    #[tokio::test]
    async fn changed_wakes_async_waiter() {
        let hub = ChangeHub::new();
        let mut sub = hub.subscribe(&["reports"]);

        let notifier = hub.clone();
        tokio::spawn(async move {
            notifier.notify(&["reports"]);
        });

        assert_eq!(sub.changed().await, Some(TableChange { table: "reports" }));
    }
}
