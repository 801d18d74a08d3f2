//! Providers, provider accounts and accounts.

use super::Entity;
use crate::wire::{flag, int, text, wire_enum};
use cache_database::tables::{self, TableSchema};
use cache_reconciler::{Record, Scope};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

wire_enum!(ProviderStatus {
    Supported => "SUPPORTED",
    Beta => "BETA",
    Disabled => "DISABLED",
    Unsupported => "UNSUPPORTED",
    ComingSoon => "COMING_SOON",
    Outage => "OUTAGE",
});

wire_enum!(AccountType {
    Bank => "bank",
    Savings => "savings",
    CreditCard => "credit_card",
    SuperAnnuation => "super_annuation",
    Investment => "investment",
    Loan => "loan",
    Mortgage => "mortgage",
    Other => "other",
});

wire_enum!(AccountStatus {
    Active => "active",
    Inactive => "inactive",
    ToBeClosed => "to_be_closed",
    Closed => "closed",
    Deleted => "deleted",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub status: ProviderStatus,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub small_logo_url: Option<String>,
    #[serde(default)]
    pub container_names: Vec<String>,
}

impl Record for Provider {
    const TABLE: TableSchema = tables::PROVIDERS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("status", text(self.status.as_str())),
            ("popular", flag(self.popular)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFilter {
    pub statuses: Option<Vec<ProviderStatus>>,
    pub popular: Option<bool>,
}

impl Entity for Provider {
    type Filter = ProviderFilter;

    fn endpoint(_: &ProviderFilter) -> String {
        "aggregation/providers".to_string()
    }

    fn scope(filter: &ProviderFilter) -> Scope {
        let mut scope = Scope::all();
        if let Some(statuses) = &filter.statuses {
            scope = scope.is_in("status", "statuses", statuses.iter());
        }
        if let Some(popular) = filter.popular {
            scope = scope.eq("popular", "popular", popular);
        }
        scope
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAccount {
    pub id: i64,
    pub provider_id: i64,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub refresh_status: Option<serde_json::Value>,
    #[serde(default)]
    pub external_id: Option<String>,
}

impl Record for ProviderAccount {
    const TABLE: TableSchema = tables::PROVIDER_ACCOUNTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![("provider_id", int(self.provider_id))]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderAccountFilter {
    pub provider_id: Option<i64>,
}

impl Entity for ProviderAccount {
    type Filter = ProviderAccountFilter;

    fn endpoint(_: &ProviderAccountFilter) -> String {
        "aggregation/provideraccounts".to_string()
    }

    fn scope(filter: &ProviderAccountFilter) -> Scope {
        match filter.provider_id {
            Some(provider_id) => Scope::all().eq("provider_id", "provider_id", provider_id),
            None => Scope::all(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub provider_account_id: i64,
    pub account_name: String,
    pub account_type: AccountType,
    pub account_status: AccountStatus,
    #[serde(default = "default_true")]
    pub included: bool,
    #[serde(default)]
    pub nick_name: Option<String>,
    #[serde(default)]
    pub current_balance: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl Record for Account {
    const TABLE: TableSchema = tables::ACCOUNTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("provider_account_id", int(self.provider_account_id)),
            ("account_type", text(self.account_type.as_str())),
            ("account_status", text(self.account_status.as_str())),
            ("included", flag(self.included)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub provider_account_id: Option<i64>,
    pub account_type: Option<AccountType>,
    pub account_status: Option<AccountStatus>,
    pub included: Option<bool>,
}

impl Entity for Account {
    type Filter = AccountFilter;

    fn endpoint(_: &AccountFilter) -> String {
        "aggregation/accounts".to_string()
    }

    fn scope(filter: &AccountFilter) -> Scope {
        let mut scope = Scope::all();
        if let Some(provider_account_id) = filter.provider_account_id {
            scope = scope.eq(
                "provider_account_id",
                "provider_account_id",
                provider_account_id,
            );
        }
        if let Some(account_type) = &filter.account_type {
            scope = scope.eq("account_type", "account_type", account_type);
        }
        if let Some(account_status) = &filter.account_status {
            scope = scope.eq("account_status", "account_status", account_status);
        }
        if let Some(included) = filter.included {
            scope = scope.eq("included", "included", included);
        }
        scope
    }
}
