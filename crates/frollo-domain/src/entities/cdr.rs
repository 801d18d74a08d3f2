//! Consumer data right: consents, external parties, disclosure consents.

use super::Entity;
use crate::wire::{flag, int, opt_int, text, wire_enum};
use cache_database::tables::{self, TableSchema};
use cache_reconciler::{Record, Scope};
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

wire_enum!(ConsentStatus {
    Pending => "pending",
    Active => "active",
    Withdrawn => "withdrawn",
    Expired => "expired",
});

wire_enum!(ExternalPartyType {
    Trusted => "trusted_adviser",
    Accredited => "accredited_data_recipient",
    Sponsor => "sponsor",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consent {
    pub id: i64,
    pub provider_id: i64,
    #[serde(default)]
    pub provider_account_id: Option<i64>,
    pub status: ConsentStatus,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub sharing_duration: Option<i64>,
    #[serde(default)]
    pub sharing_started_at: Option<String>,
    #[serde(default)]
    pub sharing_stopped_at: Option<String>,
}

impl Record for Consent {
    const TABLE: TableSchema = tables::CONSENTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("provider_id", int(self.provider_id)),
            ("provider_account_id", opt_int(self.provider_account_id)),
            ("status", text(self.status.as_str())),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentFilter {
    pub provider_id: Option<i64>,
    pub provider_account_id: Option<i64>,
    pub status: Option<ConsentStatus>,
}

impl Entity for Consent {
    type Filter = ConsentFilter;

    fn endpoint(_: &ConsentFilter) -> String {
        "cdr/consents".to_string()
    }

    fn scope(filter: &ConsentFilter) -> Scope {
        let mut scope = Scope::all();
        if let Some(provider_id) = filter.provider_id {
            scope = scope.eq("provider_id", "provider_id", provider_id);
        }
        if let Some(provider_account_id) = filter.provider_account_id {
            scope = scope.eq(
                "provider_account_id",
                "provider_account_id",
                provider_account_id,
            );
        }
        if let Some(status) = &filter.status {
            scope = scope.eq("status", "status", status);
        }
        scope
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalParty {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub party_type: ExternalPartyType,
    #[serde(default)]
    pub trusted_advisor: bool,
    #[serde(default)]
    pub company: Option<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Record for ExternalParty {
    const TABLE: TableSchema = tables::EXTERNAL_PARTIES;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("trusted_advisor", flag(self.trusted_advisor)),
            ("party_type", text(self.party_type.as_str())),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalPartyFilter {
    pub trusted_advisor: Option<bool>,
    pub party_type: Option<ExternalPartyType>,
}

impl Entity for ExternalParty {
    type Filter = ExternalPartyFilter;

    fn endpoint(_: &ExternalPartyFilter) -> String {
        "cdr/parties/external".to_string()
    }

    fn scope(filter: &ExternalPartyFilter) -> Scope {
        let mut scope = Scope::all();
        if let Some(trusted_advisor) = filter.trusted_advisor {
            scope = scope.eq("trusted_advisor", "trusted_advisor", trusted_advisor);
        }
        if let Some(party_type) = &filter.party_type {
            scope = scope.eq("party_type", "type", party_type);
        }
        scope
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureConsent {
    pub id: i64,
    pub status: ConsentStatus,
    #[serde(default)]
    pub linked_id: Option<i64>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub sharing_started_at: Option<String>,
}

impl Record for DisclosureConsent {
    const TABLE: TableSchema = tables::DISCLOSURE_CONSENTS;

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![("status", text(self.status.as_str()))]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisclosureConsentFilter {
    pub status: Option<ConsentStatus>,
}

impl Entity for DisclosureConsent {
    type Filter = DisclosureConsentFilter;

    fn endpoint(_: &DisclosureConsentFilter) -> String {
        "cdr/disclosures/consents".to_string()
    }

    fn scope(filter: &DisclosureConsentFilter) -> Scope {
        match &filter.status {
            Some(status) => Scope::all().eq("status", "status", status),
            None => Scope::all(),
        }
    }
}
