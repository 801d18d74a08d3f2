//! Record types and fixtures shared by the unit tests.

use crate::record::Record;
use crate::store::CacheStore;
use cache_database::tables::{TableSchema, BUDGETS, BUDGET_PERIODS};
use cache_database::{AsyncDatabase, ChangeHub};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestBudget {
    pub id: i64,
    pub is_current: bool,
    pub budget_type: String,
    pub type_value: String,
    pub status: String,
    pub tracking_status: String,
    pub frequency: String,
}

impl TestBudget {
    pub fn new(id: i64, budget_type: &str) -> Self {
        Self {
            id,
            is_current: true,
            budget_type: budget_type.to_string(),
            type_value: "groceries".to_string(),
            status: "ACTIVE".to_string(),
            tracking_status: "ON_TRACK".to_string(),
            frequency: "WEEKLY".to_string(),
        }
    }
}

impl Record for TestBudget {
    const TABLE: TableSchema = BUDGETS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("is_current", Value::Integer(self.is_current as i64)),
            ("budget_type", Value::Text(self.budget_type.clone())),
            ("type_value", Value::Text(self.type_value.clone())),
            ("status", Value::Text(self.status.clone())),
            ("tracking_status", Value::Text(self.tracking_status.clone())),
            ("frequency", Value::Text(self.frequency.clone())),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPeriod {
    pub id: i64,
    pub budget_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub tracking_status: String,
}

impl TestPeriod {
    pub fn new(id: i64, budget_id: i64) -> Self {
        Self {
            id,
            budget_id,
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-07".to_string(),
            tracking_status: "ON_TRACK".to_string(),
        }
    }
}

impl Record for TestPeriod {
    const TABLE: TableSchema = BUDGET_PERIODS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("budget_id", Value::Integer(self.budget_id)),
            ("start_date", Value::Text(self.start_date.clone())),
            ("end_date", Value::Text(self.end_date.clone())),
            ("tracking_status", Value::Text(self.tracking_status.clone())),
        ]
    }
}

pub async fn memory_store() -> CacheStore {
    let db = AsyncDatabase::open_in_memory().await.unwrap();
    CacheStore::new(db, ChangeHub::new())
}

pub fn budget_json(id: i64, budget_type: &str) -> serde_json::Value {
    serde_json::to_value(TestBudget::new(id, budget_type)).unwrap()
}
