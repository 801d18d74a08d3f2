//! Known cache tables and their filterable columns.
//!
//! Predicates are assembled from column names at runtime, so every name is
//! checked against this list before it reaches SQL.

/// A cache table: `id INTEGER PRIMARY KEY`, the listed indexed columns, and
/// a `payload` column with the full JSON record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSchema {
    /// Whether `column` can appear in a predicate on this table.
    pub fn has_column(&self, column: &str) -> bool {
        column == "id" || self.columns.contains(&column)
    }
}

pub const PROVIDERS: TableSchema = TableSchema {
    name: "providers",
    columns: &["status", "popular"],
};

pub const PROVIDER_ACCOUNTS: TableSchema = TableSchema {
    name: "provider_accounts",
    columns: &["provider_id"],
};

pub const ACCOUNTS: TableSchema = TableSchema {
    name: "accounts",
    columns: &["provider_account_id", "account_type", "account_status", "included"],
};

pub const CONSENTS: TableSchema = TableSchema {
    name: "consents",
    columns: &["provider_id", "provider_account_id", "status"],
};

pub const EXTERNAL_PARTIES: TableSchema = TableSchema {
    name: "external_parties",
    columns: &["trusted_advisor", "party_type"],
};

pub const DISCLOSURE_CONSENTS: TableSchema = TableSchema {
    name: "disclosure_consents",
    columns: &["status"],
};

pub const BUDGETS: TableSchema = TableSchema {
    name: "budgets",
    columns: &[
        "is_current",
        "budget_type",
        "type_value",
        "status",
        "tracking_status",
        "frequency",
    ],
};

pub const BUDGET_PERIODS: TableSchema = TableSchema {
    name: "budget_periods",
    columns: &["budget_id", "start_date", "end_date", "tracking_status"],
};

pub const MESSAGES: TableSchema = TableSchema {
    name: "messages",
    columns: &["event", "read", "interacted", "content_type"],
};

pub const REPORTS: TableSchema = TableSchema {
    name: "reports",
    columns: &["account_id", "period", "date"],
};

/// Every table created by the migrations.
pub const ALL: &[TableSchema] = &[
    PROVIDERS,
    PROVIDER_ACCOUNTS,
    ACCOUNTS,
    CONSENTS,
    EXTERNAL_PARTIES,
    DISCLOSURE_CONSENTS,
    BUDGETS,
    BUDGET_PERIODS,
    MESSAGES,
    REPORTS,
];

/// Look up a table by name.
pub fn schema(name: &str) -> Option<&'static TableSchema> {
    ALL.iter().find(|table| table.name == name)
}
