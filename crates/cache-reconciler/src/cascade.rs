//! Parent to child cleanup links.
//!
//! SQLite foreign keys are not used for this: a child may be cached before
//! its parent, and only some relations should cascade at all. Links are
//! declared once per SDK instance and applied by the reconciler inside the
//! same transaction that deleted the parents.

use crate::error::{SyncError, SyncResult};
use crate::store::{delete_many, ids_where_in};
use cache_database::tables::TableSchema;
use cache_database::DatabaseResult;
use rusqlite::Connection;
use std::collections::VecDeque;

/// Deleting a `parent` row deletes every `child` row whose `foreign_key`
/// holds the parent id.
///
/// Links are independent: rows removed through one link are parents for the
/// links registered on the child table. A multi-hop cascade exists only when
/// every hop is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeLink {
    pub parent: TableSchema,
    pub child: TableSchema,
    pub foreign_key: &'static str,
}

impl CascadeLink {
    pub fn new(parent: TableSchema, child: TableSchema, foreign_key: &'static str) -> Self {
        Self {
            parent,
            child,
            foreign_key,
        }
    }
}

/// Rows removed from one child table by a cascade.
pub type CascadeCount = (&'static str, usize);

/// Registry of cascade links.
#[derive(Debug, Clone, Default)]
pub struct CascadeRules {
    links: Vec<CascadeLink>,
}

impl CascadeRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link. The foreign key must be a column of the child table.
    pub fn register(&mut self, link: CascadeLink) -> SyncResult<()> {
        if link.foreign_key == "id" || !link.child.has_column(link.foreign_key) {
            return Err(SyncError::InvalidScope(format!(
                "cascade {} -> {}: no foreign key column {}",
                link.parent.name, link.child.name, link.foreign_key
            )));
        }
        if self.links.contains(&link) {
            return Ok(());
        }
        self.links.push(link);
        Ok(())
    }

    pub fn with(mut self, link: CascadeLink) -> SyncResult<Self> {
        self.register(link)?;
        Ok(self)
    }

    pub fn links(&self) -> &[CascadeLink] {
        &self.links
    }

    /// Delete the dependents of `parent_ids` that were just removed from
    /// `parent_table`. Must run inside the caller's transaction.
    ///
    /// Returns removed-row counts per child table, in first-touched order.
    pub fn on_deleted(
        &self,
        conn: &Connection,
        parent_table: &'static str,
        parent_ids: &[i64],
    ) -> DatabaseResult<Vec<CascadeCount>> {
        let mut counts: Vec<CascadeCount> = Vec::new();
        let mut pending: VecDeque<(&'static str, Vec<i64>)> = VecDeque::new();
        pending.push_back((parent_table, parent_ids.to_vec()));

        while let Some((table, ids)) = pending.pop_front() {
            if ids.is_empty() {
                continue;
            }
            for link in self.links.iter().filter(|link| link.parent.name == table) {
                let child_ids = ids_where_in(conn, link.child.name, link.foreign_key, &ids)?;
                if child_ids.is_empty() {
                    continue;
                }

                let removed = delete_many(conn, link.child.name, &child_ids)?;
                tracing::debug!(
                    parent = table,
                    child = link.child.name,
                    removed,
                    "Cascade delete"
                );
                match counts.iter_mut().find(|(name, _)| *name == link.child.name) {
                    Some((_, total)) => *total += removed,
                    None => counts.push((link.child.name, removed)),
                }

                pending.push_back((link.child.name, child_ids));
            }
        }

        Ok(counts)
    }
}
