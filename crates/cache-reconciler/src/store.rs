//! Table operations used inside transactions, and the [`CacheStore`] read
//! side.

use crate::error::SyncResult;
use crate::observable::ObservableQuery;
use crate::record::{decode_payload, PreparedRow, Record};
use crate::scope::{LocalPredicate, Scope};
use cache_database::tables::TableSchema;
use cache_database::{AsyncDatabase, ChangeHub, DatabaseResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Ids per `IN (...)` statement.
const CHUNK: usize = 500;

/// Insert or fully replace rows by primary key.
pub fn upsert_many(
    conn: &Connection,
    schema: &TableSchema,
    rows: &[PreparedRow],
) -> DatabaseResult<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    let names: Vec<&str> = schema.columns.to_vec();
    let placeholders: Vec<String> = (1..=names.len() + 2).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = names
        .iter()
        .chain(std::iter::once(&"payload"))
        .map(|name| format!("{name} = excluded.{name}"))
        .collect();
    let sql = format!(
        "INSERT INTO {table} (id, {columns}, payload) VALUES ({placeholders})
         ON CONFLICT(id) DO UPDATE SET {updates}",
        table = schema.name,
        columns = names.join(", "),
        placeholders = placeholders.join(", "),
        updates = updates.join(", "),
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    for row in rows {
        let values = std::iter::once(Value::Integer(row.id))
            .chain(row.columns.iter().map(|(_, value)| value.clone()))
            .chain(std::iter::once(Value::Text(row.payload.clone())));
        stmt.execute(params_from_iter(values))?;
    }
    Ok(rows.len())
}

/// Ids of the rows matching `predicate`, ascending.
pub fn query_ids_by_scope(
    conn: &Connection,
    schema: &TableSchema,
    predicate: &LocalPredicate,
) -> DatabaseResult<Vec<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE {} ORDER BY id",
        schema.name, predicate.sql
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(predicate.params.iter()), |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// JSON payloads of the rows matching `predicate`, ordered by id.
pub fn query_payloads(
    conn: &Connection,
    schema: &TableSchema,
    predicate: &LocalPredicate,
) -> DatabaseResult<Vec<String>> {
    let sql = format!(
        "SELECT payload FROM {} WHERE {} ORDER BY id",
        schema.name, predicate.sql
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let payloads = stmt
        .query_map(params_from_iter(predicate.params.iter()), |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(payloads)
}

/// Delete rows by id. Returns how many existed.
pub fn delete_many(conn: &Connection, table: &str, ids: &[i64]) -> DatabaseResult<usize> {
    let mut deleted = 0;
    for chunk in ids.chunks(CHUNK) {
        let sql = format!(
            "DELETE FROM {} WHERE id IN ({})",
            table,
            vec!["?"; chunk.len()].join(", ")
        );
        deleted += conn.execute(&sql, params_from_iter(chunk.iter()))?;
    }
    Ok(deleted)
}

/// Ids of rows in `table` whose `column` is one of `values`.
pub fn ids_where_in(
    conn: &Connection,
    table: &str,
    column: &str,
    values: &[i64],
) -> DatabaseResult<Vec<i64>> {
    let mut ids = Vec::new();
    for chunk in values.chunks(CHUNK) {
        let sql = format!(
            "SELECT id FROM {} WHERE {} IN ({}) ORDER BY id",
            table,
            column,
            vec!["?"; chunk.len()].join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let found = stmt
            .query_map(params_from_iter(chunk.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids.extend(found);
    }
    Ok(ids)
}

/// Read side of the cache.
#[derive(Clone)]
pub struct CacheStore {
    db: AsyncDatabase,
    hub: ChangeHub,
}

impl CacheStore {
    pub fn new(db: AsyncDatabase, hub: ChangeHub) -> Self {
        Self { db, hub }
    }

    pub fn db(&self) -> &AsyncDatabase {
        &self.db
    }

    pub fn hub(&self) -> &ChangeHub {
        &self.hub
    }

    /// Cached records matching `scope`, ordered by id.
    pub async fn fetch<R: Record>(&self, scope: &Scope) -> SyncResult<Vec<R>> {
        let predicate = scope.to_local_predicate(&R::TABLE)?;
        load::<R>(&self.db, predicate).await
    }

    pub async fn fetch_by_id<R: Record>(&self, id: i64) -> SyncResult<Option<R>> {
        let predicate = LocalPredicate {
            sql: "id = ?".to_string(),
            params: vec![Value::Integer(id)],
        };
        Ok(load::<R>(&self.db, predicate).await?.into_iter().next())
    }

    /// Cached ids matching `scope`, ascending.
    pub async fn ids<R: Record>(&self, scope: &Scope) -> SyncResult<Vec<i64>> {
        let predicate = scope.to_local_predicate(&R::TABLE)?;
        let ids = self
            .db
            .call(move |conn| query_ids_by_scope(conn, &R::TABLE, &predicate))
            .await?;
        Ok(ids)
    }

    /// Live view of the records matching `scope`.
    pub fn observe<R: Record>(&self, scope: &Scope) -> SyncResult<ObservableQuery<R>> {
        let predicate = scope.to_local_predicate(&R::TABLE)?;
        let subscription = self.hub.subscribe(&[R::TABLE.name]);
        Ok(ObservableQuery::new(self.db.clone(), predicate, subscription))
    }
}

pub(crate) async fn load<R: Record>(
    db: &AsyncDatabase,
    predicate: LocalPredicate,
) -> SyncResult<Vec<R>> {
    let payloads = db
        .call(move |conn| query_payloads(conn, &R::TABLE, &predicate))
        .await?;
    payloads.iter().map(|payload| decode_payload(payload)).collect()
}
