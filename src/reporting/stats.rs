//! Vendor and system statistics.

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{RequestStore, TransactionStore, UserStore};

/// Totals for one vendor over an optional date range.
#[derive(Debug, Serialize)]
pub struct VendorStats {
    pub total_withdrawal: Decimal,
    pub total_deposit: Decimal,
    pub net_balance: Decimal,
}

/// One aggregation bucket. The field is `month` even for daily buckets to
/// keep the payload shape stable for consumers.
#[derive(Debug, Serialize)]
pub struct PeriodStats {
    pub month: String,
    pub withdrawal: Decimal,
    pub deposit: Decimal,
    pub net_balance: Decimal,
}

/// One row of the admin all-vendors rollup.
#[derive(Debug, Serialize)]
pub struct VendorStatsRow {
    pub vendor_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub stats: VendorStats,
}

#[derive(Debug, Serialize)]
pub struct SystemOverview {
    pub vendor_count: i64,
    pub requests_by_status: Vec<StatusCount>,
    pub settled_volume: Decimal,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: &'static str,
    pub count: i64,
}

/// Withdrawal/deposit/net totals for one vendor.
pub async fn vendor_stats(
    pool: &PgPool,
    vendor_id: Uuid,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<VendorStats, sqlx::Error> {
    let totals = TransactionStore::totals_for_vendor(pool, vendor_id, start, end).await?;
    Ok(VendorStats {
        total_withdrawal: totals.withdrawal,
        total_deposit: totals.deposit,
        net_balance: totals.net(),
    })
}

/// Ranges spanning up to this many days bucket by day instead of month.
const DAILY_BUCKET_MAX_DAYS: i64 = 35;

/// Bucketed totals for one vendor. Without a range, the last 12 months.
pub async fn vendor_monthly(
    pool: &PgPool,
    vendor_id: Uuid,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<PeriodStats>, sqlx::Error> {
    bucketed(pool, Some(vendor_id), start, end).await
}

/// Bucketed totals for the whole system. Without a range, the last 12
/// months.
pub async fn system_monthly(
    pool: &PgPool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<PeriodStats>, sqlx::Error> {
    bucketed(pool, None, start, end).await
}

async fn bucketed(
    pool: &PgPool,
    vendor_id: Option<Uuid>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<PeriodStats>, sqlx::Error> {
    let (start, end, daily) = match (start, end) {
        (Some(start), Some(end)) => {
            let daily = (end - start).num_days() <= DAILY_BUCKET_MAX_DAYS;
            (Some(start), Some(end), daily)
        }
        _ => {
            let twelve_months_ago = Utc::now().checked_sub_months(Months::new(12));
            (twelve_months_ago, None, false)
        }
    };

    let buckets = TransactionStore::period_totals(pool, vendor_id, start, end, daily).await?;

    Ok(buckets
        .into_iter()
        .map(|bucket| PeriodStats {
            month: bucket.period,
            net_balance: bucket.deposit - bucket.withdrawal,
            withdrawal: bucket.withdrawal,
            deposit: bucket.deposit,
        })
        .collect())
}

/// Per-vendor totals for the admin console: one page of vendors, their
/// sums aggregated in a single grouped query.
pub async fn all_vendor_stats(
    pool: &PgPool,
    search: Option<&str>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<VendorStatsRow>, i64), sqlx::Error> {
    let (vendors, total) = UserStore::list_vendors(pool, search, limit, offset).await?;
    if vendors.is_empty() {
        return Ok((Vec::new(), total));
    }

    let ids: Vec<Uuid> = vendors.iter().map(|v| v.id).collect();
    let sums = TransactionStore::totals_for_vendors(pool, &ids, start, end).await?;

    let rows = vendors
        .into_iter()
        .map(|vendor| {
            let totals = sums
                .iter()
                .find(|(id, _)| *id == vendor.id)
                .map(|(_, totals)| *totals)
                .unwrap_or_default();
            VendorStatsRow {
                vendor_id: vendor.id,
                name: vendor.name,
                email: vendor.email,
                stats: VendorStats {
                    total_withdrawal: totals.withdrawal,
                    total_deposit: totals.deposit,
                    net_balance: totals.net(),
                },
            }
        })
        .collect();

    Ok((rows, total))
}

/// System-wide counters for the admin overview.
pub async fn system_overview(pool: &PgPool) -> Result<SystemOverview, sqlx::Error> {
    let vendor_count = UserStore::count_vendors(pool).await?;
    let by_status = RequestStore::count_by_status(pool).await?;
    let settled_volume = TransactionStore::settled_volume(pool).await?;

    Ok(SystemOverview {
        vendor_count,
        requests_by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status.as_str(),
                count,
            })
            .collect(),
        settled_volume,
    })
}
