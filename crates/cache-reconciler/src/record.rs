//! Cached record types.

use crate::error::{SyncError, SyncResult};
use cache_database::tables::TableSchema;
use rusqlite::types::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A domain entity that lives in one cache table.
///
/// The full record is stored as JSON in `payload`; [`Record::columns`]
/// supplies the indexed columns scopes and cascades filter on.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: TableSchema;

    fn id(&self) -> i64;

    /// One value per column of [`Record::TABLE`], in any order.
    fn columns(&self) -> Vec<(&'static str, Value)>;
}

/// A record flattened into SQL values, ready to cross onto the database
/// thread.
#[derive(Debug, Clone)]
pub struct PreparedRow {
    pub id: i64,
    pub columns: Vec<(&'static str, Value)>,
    pub payload: String,
}

impl PreparedRow {
    pub fn from_record<R: Record>(record: &R) -> SyncResult<Self> {
        let schema = R::TABLE;
        let mut columns = record.columns();
        columns.sort_by_key(|(name, _)| schema.columns.iter().position(|c| c == name));

        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        if names != schema.columns {
            return Err(SyncError::InvalidRecord(format!(
                "{} record supplies columns {:?}, table has {:?}",
                schema.name, names, schema.columns
            )));
        }

        let payload = serde_json::to_string(record)
            .map_err(|err| SyncError::Decode(format!("{} {}: {}", schema.name, record.id(), err)))?;

        Ok(Self {
            id: record.id(),
            columns,
            payload,
        })
    }
}

/// Decode a fetched JSON record into `R`.
pub fn decode_record<R: Record>(value: serde_json::Value) -> SyncResult<R> {
    serde_json::from_value(value).map_err(|err| SyncError::Decode(format!("{}: {}", R::TABLE.name, err)))
}

pub(crate) fn decode_payload<R: Record>(payload: &str) -> SyncResult<R> {
    serde_json::from_str(payload).map_err(|err| SyncError::Decode(format!("{}: {}", R::TABLE.name, err)))
}
