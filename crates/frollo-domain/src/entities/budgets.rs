//! Budgets and their tracking periods.

use super::Entity;
use crate::wire::{flag, int, text, wire_enum};
use cache_database::tables::{self, TableSchema};
use cache_reconciler::{Record, Scope};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

wire_enum!(BudgetType {
    BudgetCategory => "budget_category",
    Category => "category",
    Merchant => "merchant",
    Tag => "tag",
});

wire_enum!(BudgetStatus {
    Active => "active",
    Completed => "completed",
    Unstarted => "unstarted",
    Cancelled => "cancelled",
});

wire_enum!(BudgetTrackingStatus {
    Above => "above",
    Below => "below",
    OnTrack => "on_track",
});

wire_enum!(BudgetFrequency {
    Annually => "annually",
    Biannually => "biannually",
    Daily => "daily",
    Fortnightly => "fortnightly",
    FourWeekly => "four_weekly",
    Monthly => "monthly",
    Quarterly => "quarterly",
    Singular => "singular",
    Weekly => "weekly",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub is_current: bool,
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub type_value: String,
    pub status: BudgetStatus,
    pub tracking_status: BudgetTrackingStatus,
    pub frequency: BudgetFrequency,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub current_amount: Option<String>,
    #[serde(default)]
    pub period_amount: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub periods_count: Option<i64>,
}

impl Record for Budget {
    const TABLE: TableSchema = tables::BUDGETS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("is_current", flag(self.is_current)),
            ("budget_type", text(self.budget_type.as_str())),
            ("type_value", text(&self.type_value)),
            ("status", text(self.status.as_str())),
            ("tracking_status", text(self.tracking_status.as_str())),
            ("frequency", text(self.frequency.as_str())),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetFilter {
    pub current: Option<bool>,
    pub budget_type: Option<BudgetType>,
    pub type_value: Option<String>,
    pub statuses: Option<Vec<BudgetStatus>>,
    pub tracking_status: Option<BudgetTrackingStatus>,
    pub frequency: Option<BudgetFrequency>,
}

impl Entity for Budget {
    type Filter = BudgetFilter;

    fn endpoint(_: &BudgetFilter) -> String {
        "budgets".to_string()
    }

    fn scope(filter: &BudgetFilter) -> Scope {
        let mut scope = Scope::all();
        if let Some(current) = filter.current {
            scope = scope.eq("is_current", "current", current);
        }
        if let Some(budget_type) = &filter.budget_type {
            scope = scope.eq("budget_type", "budget_type", budget_type);
        }
        if let Some(type_value) = &filter.type_value {
            scope = scope.eq("type_value", "type_value", type_value.as_str());
        }
        if let Some(statuses) = &filter.statuses {
            scope = scope.is_in("status", "statuses", statuses.iter());
        }
        if let Some(tracking_status) = &filter.tracking_status {
            scope = scope.eq("tracking_status", "tracking_status", tracking_status);
        }
        if let Some(frequency) = &filter.frequency {
            scope = scope.eq("frequency", "frequency", frequency);
        }
        scope
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    pub id: i64,
    pub budget_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub tracking_status: BudgetTrackingStatus,
    #[serde(default)]
    pub current_amount: Option<String>,
    #[serde(default)]
    pub target_amount: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
}

impl Record for BudgetPeriod {
    const TABLE: TableSchema = tables::BUDGET_PERIODS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("budget_id", int(self.budget_id)),
            ("start_date", text(&self.start_date)),
            ("end_date", text(&self.end_date)),
            ("tracking_status", text(self.tracking_status.as_str())),
        ]
    }
}

/// Periods are always fetched per budget. Dates are `YYYY-MM-DD` and bound
/// the period start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetPeriodFilter {
    pub budget_id: i64,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl BudgetPeriodFilter {
    pub fn for_budget(budget_id: i64) -> Self {
        Self {
            budget_id,
            from_date: None,
            to_date: None,
        }
    }
}

impl Entity for BudgetPeriod {
    type Filter = BudgetPeriodFilter;

    fn endpoint(filter: &BudgetPeriodFilter) -> String {
        format!("budgets/{}/periods", filter.budget_id)
    }

    fn scope(filter: &BudgetPeriodFilter) -> Scope {
        let mut scope = Scope::all().path_eq("budget_id", filter.budget_id);
        if let Some(from_date) = &filter.from_date {
            scope = scope.gte("start_date", "from_date", from_date.as_str());
        }
        if let Some(to_date) = &filter.to_date {
            scope = scope.lte("start_date", "to_date", to_date.as_str());
        }
        scope
    }
}
