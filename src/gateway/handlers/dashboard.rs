//! Stats and export handlers.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde::Deserialize;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, PageQuery, Paginated, ok};
use super::{parse_range, require_admin};
use crate::auth::AuthenticatedUser;
use crate::reporting;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/v1/dashboard/vendor/stats
pub async fn vendor_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<reporting::VendorStats> {
    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let stats = reporting::vendor_stats(state.pool(), user.id, start, end).await?;
    ok(stats)
}

/// GET /api/v1/dashboard/vendor/monthly
pub async fn vendor_monthly(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<reporting::PeriodStats>> {
    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let stats = reporting::vendor_monthly(state.pool(), user.id, start, end).await?;
    ok(stats)
}

#[derive(Debug, Deserialize)]
pub struct AdminVendorsQuery {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/dashboard/admin/vendors (admin)
pub async fn admin_vendor_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<AdminVendorsQuery>,
) -> ApiResult<Paginated<reporting::VendorStatsRow>> {
    require_admin(&user)?;

    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let (page, limit, offset) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve();

    let (rows, total) = reporting::all_vendor_stats(
        state.pool(),
        query.search.as_deref(),
        start,
        end,
        limit,
        offset,
    )
    .await?;

    ok(Paginated::new(rows, total, page, limit))
}

/// GET /api/v1/dashboard/admin/overview (admin)
pub async fn admin_overview(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<reporting::SystemOverview> {
    require_admin(&user)?;
    let overview = reporting::system_overview(state.pool()).await?;
    ok(overview)
}

/// GET /api/v1/dashboard/admin/monthly (admin)
pub async fn admin_monthly(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<reporting::PeriodStats>> {
    require_admin(&user)?;
    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let stats = reporting::system_monthly(state.pool(), start, end).await?;
    ok(stats)
}

/// GET /api/v1/dashboard/export (admin)
///
/// Settlement transactions as a CSV attachment.
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;

    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let csv = reporting::export_transactions_csv(state.pool(), start, end).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"settlements.csv\"",
            ),
        ],
        csv,
    ))
}
