//! Cached Frollo entities.
//!
//! Each entity maps onto one cache table and declares how its filter is
//! expressed: the endpoint to call and the [`Scope`] that is both sent
//! upstream and used for stale detection.

mod aggregation;
mod budgets;
mod cdr;
mod messages;
mod reports;

pub use aggregation::{
    Account, AccountFilter, AccountStatus, AccountType, Provider, ProviderAccount,
    ProviderAccountFilter, ProviderFilter, ProviderStatus,
};
pub use budgets::{
    Budget, BudgetFilter, BudgetFrequency, BudgetPeriod, BudgetPeriodFilter, BudgetStatus,
    BudgetTrackingStatus, BudgetType,
};
pub use cdr::{
    Consent, ConsentFilter, ConsentStatus, DisclosureConsent, DisclosureConsentFilter,
    ExternalParty, ExternalPartyFilter, ExternalPartyType,
};
pub use messages::{Message, MessageFilter};
pub use reports::{Report, ReportFilter, ReportPeriod};

use cache_reconciler::{Record, Scope};
use std::fmt::Debug;

/// A record type the SDK knows how to fetch.
pub trait Entity: Record {
    type Filter: Clone + Debug + Send + Sync + 'static;

    /// API path, relative to the base URL.
    fn endpoint(filter: &Self::Filter) -> String;

    /// Scope selecting the records `filter` asks for.
    fn scope(filter: &Self::Filter) -> Scope;
}
