//! Read-only rollups over the settlement ledger.
//!
//! Balances and stats are derived on demand by summing transactions; there
//! is no running-balance table to drift out of sync.

pub mod export;
pub mod stats;

pub use export::export_transactions_csv;
pub use stats::{
    PeriodStats, SystemOverview, VendorStats, VendorStatsRow, all_vendor_stats, system_monthly,
    system_overview, vendor_monthly, vendor_stats,
};
