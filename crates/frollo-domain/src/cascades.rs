//! Cascade links between Frollo entity tables.

use cache_database::tables::{ACCOUNTS, BUDGETS, BUDGET_PERIODS, PROVIDERS, PROVIDER_ACCOUNTS, REPORTS};
use cache_reconciler::{CascadeLink, CascadeRules, SyncResult};

/// Links applied whenever a parent row leaves the cache.
///
/// Provider removal walks down to accounts; account removal drops their
/// balance reports. Budget periods follow their budget.
pub fn frollo_cascade_rules() -> SyncResult<CascadeRules> {
    CascadeRules::new()
        .with(CascadeLink::new(BUDGETS, BUDGET_PERIODS, "budget_id"))?
        .with(CascadeLink::new(PROVIDERS, PROVIDER_ACCOUNTS, "provider_id"))?
        .with(CascadeLink::new(PROVIDER_ACCOUNTS, ACCOUNTS, "provider_account_id"))?
        .with(CascadeLink::new(ACCOUNTS, REPORTS, "account_id"))
}
