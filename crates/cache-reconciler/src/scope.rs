//! Scopes: one filter value, rendered both as remote query parameters and
//! as a local SQL predicate.
//!
//! Stale deletion is only correct when the cache is compared against
//! exactly the filter the server applied. Building both renderings from the
//! same [`Scope`] keeps them from drifting apart.

use crate::error::{SyncError, SyncResult};
use cache_database::tables::TableSchema;
use rusqlite::types::Value;

/// A scalar filter operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeValue {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl ScopeValue {
    fn to_remote(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Text(value) => value.clone(),
            Self::Bool(value) => value.to_string(),
        }
    }

    fn to_sql(&self) -> Value {
        match self {
            Self::Int(value) => Value::Integer(*value),
            Self::Text(value) => Value::Text(value.clone()),
            Self::Bool(value) => Value::Integer(i64::from(*value)),
        }
    }
}

impl From<i64> for ScopeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ScopeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ScopeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScopeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    In,
    Gte,
    Lte,
}

/// One `column <op> value(s)` clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub column: &'static str,
    /// Query parameter name on the API. `None` when the endpoint path
    /// already carries the filter (e.g. `budgets/{budget_id}/periods`).
    pub remote_name: Option<&'static str>,
    pub op: Op,
    pub values: Vec<ScopeValue>,
}

/// Conjunction of conditions over one table. The empty scope matches every
/// cached row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Scope {
    conditions: Vec<Condition>,
}

impl Scope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(
        self,
        column: &'static str,
        remote_name: &'static str,
        value: impl Into<ScopeValue>,
    ) -> Self {
        self.with(column, Some(remote_name), Op::Eq, vec![value.into()])
    }

    pub fn is_in<V: Into<ScopeValue>>(
        self,
        column: &'static str,
        remote_name: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.with(column, Some(remote_name), Op::In, values)
    }

    pub fn gte(
        self,
        column: &'static str,
        remote_name: &'static str,
        value: impl Into<ScopeValue>,
    ) -> Self {
        self.with(column, Some(remote_name), Op::Gte, vec![value.into()])
    }

    pub fn lte(
        self,
        column: &'static str,
        remote_name: &'static str,
        value: impl Into<ScopeValue>,
    ) -> Self {
        self.with(column, Some(remote_name), Op::Lte, vec![value.into()])
    }

    /// Equality the endpoint path encodes. Filters locally only.
    pub fn path_eq(self, column: &'static str, value: impl Into<ScopeValue>) -> Self {
        self.with(column, None, Op::Eq, vec![value.into()])
    }

    fn with(
        mut self,
        column: &'static str,
        remote_name: Option<&'static str>,
        op: Op,
        values: Vec<ScopeValue>,
    ) -> Self {
        self.conditions.push(Condition {
            column,
            remote_name,
            op,
            values,
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check operand counts: `In` needs at least one value, every other
    /// operator exactly one. An empty `In` has no faithful remote form.
    pub fn validate(&self) -> SyncResult<()> {
        for condition in &self.conditions {
            match (condition.op, condition.values.len()) {
                (Op::In, 0) => {
                    return Err(SyncError::InvalidScope(format!(
                        "{} IN needs at least one value",
                        condition.column
                    )))
                }
                (Op::In, _) | (_, 1) => {}
                _ => {
                    return Err(SyncError::InvalidScope(format!(
                        "{} expects exactly one value",
                        condition.column
                    )))
                }
            }
        }
        Ok(())
    }

    /// Query parameters the server filters by. `In` renders comma separated.
    pub fn to_remote_query_params(&self) -> Vec<(String, String)> {
        self.conditions
            .iter()
            .filter_map(|condition| {
                let name = condition.remote_name?;
                let value = condition
                    .values
                    .iter()
                    .map(ScopeValue::to_remote)
                    .collect::<Vec<_>>()
                    .join(",");
                Some((name.to_string(), value))
            })
            .collect()
    }

    /// SQL predicate over `schema`. Fails when a column is unknown or the
    /// scope does not validate.
    pub fn to_local_predicate(&self, schema: &TableSchema) -> SyncResult<LocalPredicate> {
        self.validate()?;
        let mut clauses = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::new();

        for condition in &self.conditions {
            if !schema.has_column(condition.column) {
                return Err(SyncError::InvalidScope(format!(
                    "{} has no column {}",
                    schema.name, condition.column
                )));
            }

            let clause = match condition.op {
                Op::In => format!(
                    "{} IN ({})",
                    condition.column,
                    vec!["?"; condition.values.len()].join(", ")
                ),
                Op::Gte => format!("{} >= ?", condition.column),
                Op::Lte => format!("{} <= ?", condition.column),
                Op::Eq => format!("{} = ?", condition.column),
            };

            clauses.push(clause);
            params.extend(condition.values.iter().map(ScopeValue::to_sql));
        }

        let sql = if clauses.is_empty() {
            "1".to_string()
        } else {
            clauses.join(" AND ")
        };

        Ok(LocalPredicate { sql, params })
    }
}

/// Rendered WHERE clause with positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPredicate {
    pub sql: String,
    pub params: Vec<Value>,
}

impl LocalPredicate {
    /// Narrow the predicate to the id range of one page.
    pub fn within(mut self, bounds: PageBounds) -> Self {
        if let Some(lower) = bounds.before {
            self.sql.push_str(" AND id > ?");
            self.params.push(Value::Integer(lower));
        }
        if let Some(upper) = bounds.after {
            self.sql.push_str(" AND id <= ?");
            self.params.push(Value::Integer(upper));
        }
        self
    }
}

/// Id range `before < id <= after` covered by one page. An absent side is
/// open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageBounds {
    pub before: Option<i64>,
    pub after: Option<i64>,
}

impl PageBounds {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.before.map_or(true, |lower| id > lower) && self.after.map_or(true, |upper| id <= upper)
    }
}
