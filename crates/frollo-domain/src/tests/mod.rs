//! Cross-entity tests.
//!
//! - `scope_symmetry.rs` - every shipped filter selects the same records
//!   upstream and in the cache


use crate::{Entity, EntityManager};
use cache_database::{AsyncDatabase, ChangeHub};
use cache_reconciler::{CacheStore, CascadeRules, Reconciler, Record, Scope};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use remote_fetch_gateway::ScriptedGateway;
use serde_json::Value;
use std::sync::Arc;

/// How the server compares one query parameter against a wire field.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Cmp {
    /// Equality, or membership for comma separated values.
    OneOf,
    AtLeast,
    AtMost,
}

/// One query parameter the server understands, and the wire field it reads.
pub(crate) struct Param {
    pub name: &'static str,
    pub field: &'static str,
    pub cmp: Cmp,
}

pub(crate) const fn param(name: &'static str, field: &'static str, cmp: Cmp) -> Param {
    Param { name, field, cmp }
}

/// In-process stand-in for one API collection.
pub(crate) struct Server {
    pub records: Vec<Value>,
    pub params: Vec<Param>,
    /// Filter carried by the endpoint path.
    pub path: fn(&str, &Value) -> bool,
}

pub(crate) fn any_path(_: &str, _: &Value) -> bool {
    true
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl Server {
    pub fn new(records: Vec<Value>, params: Vec<Param>) -> Self {
        Self {
            records,
            params,
            path: any_path,
        }
    }

    pub fn with_path(mut self, path: fn(&str, &Value) -> bool) -> Self {
        self.path = path;
        self
    }

    /// Ids of the records the server returns for `endpoint?query`. A
    /// parameter the server does not know fails the test.
    pub fn serve(&self, endpoint: &str, query: &[(String, String)]) -> Vec<i64> {
        self.records
            .iter()
            .filter(|record| {
                (self.path)(endpoint, record)
                    && query.iter().all(|(name, value)| {
                        let param = self
                            .params
                            .iter()
                            .find(|param| param.name == name)
                            .unwrap_or_else(|| panic!("{} does not filter by {}", endpoint, name));
                        let field = render(&record[param.field]);
                        match param.cmp {
                            Cmp::OneOf => value.split(',').any(|candidate| candidate == field),
                            Cmp::AtLeast => field.as_str() >= value.as_str(),
                            Cmp::AtMost => field.as_str() <= value.as_str(),
                        }
                    })
            })
            .map(|record| record["id"].as_i64().unwrap())
            .collect()
    }
}

/// Seed the cache with every server record, then compare what the server
/// returns for random filters with what `EntityManager::fetch` reads back.
pub(crate) fn assert_symmetric<E: Entity>(
    server: Server,
    filters: impl Strategy<Value = E::Filter>,
) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let manager = runtime.block_on(async {
        let db = AsyncDatabase::open_in_memory().await.unwrap();
        let store = CacheStore::new(db, ChangeHub::new());
        let records: Vec<E> = server
            .records
            .iter()
            .map(|record| serde_json::from_value(record.clone()).unwrap())
            .collect();
        Reconciler::<E>::new(store.clone(), Arc::new(CascadeRules::new()))
            .reconcile(records, &Scope::all())
            .await
            .unwrap();
        EntityManager::<E>::new(
            store,
            Arc::new(ScriptedGateway::new()),
            Arc::new(CascadeRules::new()),
        )
    });

    let mut runner = TestRunner::new(Config::with_cases(64));
    runner
        .run(&filters, |filter| {
            let query = E::scope(&filter).to_remote_query_params();
            let remote = server.serve(&E::endpoint(&filter), &query);
            let local: Vec<i64> = runtime
                .block_on(manager.fetch(&filter))
                .unwrap()
                .iter()
                .map(|record| record.id())
                .collect();
            prop_assert_eq!(remote, local, "filter {:?}", filter);
            Ok(())
        })
        .unwrap();
}
