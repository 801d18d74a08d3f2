//! Account balance history reports.

use super::Entity;
use crate::wire::{int, text, wire_enum};
use cache_database::tables::{self, TableSchema};
use cache_reconciler::{Record, Scope};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

wire_enum!(ReportPeriod {
    Day => "by_day",
    Week => "by_week",
    Month => "by_month",
});

/// One balance data point of one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub account_id: i64,
    pub period: ReportPeriod,
    /// `YYYY-MM-DD`, or `YYYY-MM` for monthly reports.
    pub date: String,
    pub value: String,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Record for Report {
    const TABLE: TableSchema = tables::REPORTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("account_id", int(self.account_id)),
            ("period", text(self.period.as_str())),
            ("date", text(&self.date)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    pub period: ReportPeriod,
    pub from_date: String,
    pub to_date: String,
    pub account_id: Option<i64>,
}

impl Entity for Report {
    type Filter = ReportFilter;

    fn endpoint(_: &ReportFilter) -> String {
        "reports/accounts/history/balances".to_string()
    }

    fn scope(filter: &ReportFilter) -> Scope {
        let mut scope = Scope::all()
            .eq("period", "period", &filter.period)
            .gte("date", "from_date", filter.from_date.as_str())
            .lte("date", "to_date", filter.to_date.as_str());
        if let Some(account_id) = filter.account_id {
            scope = scope.eq("account_id", "account_id", account_id);
        }
        scope
    }
}
