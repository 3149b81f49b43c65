//! Request repository.
//!
//! Status transitions happen in the lifecycle service under CAS-guarded
//! updates; this module owns inserts, row mapping and read queries. Listing
//! queries exclude tombstoned rows; direct lookups keep them visible for
//! audit.

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::bad_code;
use crate::domain::{BankDetails, Request, RequestStatus, RequestType};

const REQUEST_COLUMNS: &str = "request_id, req_type, amount, status, bank_details, upi_id, qr_code, \
                               paid_amount, pending_amount, rejection_reason, payment_failure_reason, \
                               cancellation_reason, created_by, picked_by, created_at, updated_at, deleted_at";

/// Optional filters for the available-requests board.
#[derive(Debug, Default, Clone)]
pub struct AvailableFilter {
    pub amount: Option<Decimal>,
    pub min_amount: Option<Decimal>,
    pub kind: Option<RequestType>,
}

/// Optional filters for per-vendor request history.
#[derive(Debug, Default, Clone)]
pub struct HistoryFilter {
    pub status: Option<RequestStatus>,
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
}

/// Optional filters for the admin request listing.
#[derive(Debug, Default, Clone)]
pub struct AdminFilter {
    pub status: Option<RequestStatus>,
    pub kind: Option<RequestType>,
    pub vendor_id: Option<Uuid>,
    pub start: Option<chrono::DateTime<chrono::Utc>>,
    pub end: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct RequestStore;

impl RequestStore {
    /// Insert a new request row.
    pub async fn insert(conn: &mut PgConnection, request: &Request) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO requests_tb
                (request_id, req_type, amount, status, bank_details, upi_id, qr_code,
                 paid_amount, pending_amount, rejection_reason, payment_failure_reason,
                 cancellation_reason, created_by, picked_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW())
            "#,
        )
        .bind(request.id)
        .bind(request.kind.id())
        .bind(request.amount)
        .bind(request.status.id())
        .bind(request.bank_details.as_ref().map(Json))
        .bind(&request.upi_id)
        .bind(&request.qr_code)
        .bind(request.paid_amount)
        .bind(request.pending_amount)
        .bind(&request.rejection_reason)
        .bind(&request.payment_failure_reason)
        .bind(&request.cancellation_reason)
        .bind(request.created_by)
        .bind(request.picked_by)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Fetch one request (tombstoned rows included, for audit).
    pub async fn get(pool: &PgPool, request_id: Uuid) -> Result<Option<Request>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests_tb WHERE request_id = $1"
        ))
        .bind(request_id)
        .fetch_optional(pool)
        .await?;

        row.map(|r| row_to_request(&r)).transpose()
    }

    /// PENDING requests available to `viewer` (never their own), newest
    /// first. Tombstoned rows never surface here.
    pub async fn available(
        pool: &PgPool,
        viewer: Uuid,
        filter: &AvailableFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Request>, i64), sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM requests_tb WHERE deleted_at IS NULL AND status = "
        ));
        query.push_bind(RequestStatus::Pending.id());
        query.push(" AND created_by <> ");
        query.push_bind(viewer);
        push_available_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(pool).await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM requests_tb WHERE deleted_at IS NULL AND status = ",
        );
        count.push_bind(RequestStatus::Pending.id());
        count.push(" AND created_by <> ");
        count.push_bind(viewer);
        push_available_filters(&mut count, filter);

        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        collect_requests(rows).map(|requests| (requests, total))
    }

    /// Requests created by `owner`, newest first.
    pub async fn created_by(
        pool: &PgPool,
        owner: Uuid,
        filter: &HistoryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Request>, i64), sqlx::Error> {
        Self::history(pool, "created_by", owner, filter, limit, offset).await
    }

    /// Requests picked by `picker`, newest first.
    pub async fn picked_by(
        pool: &PgPool,
        picker: Uuid,
        filter: &HistoryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Request>, i64), sqlx::Error> {
        Self::history(pool, "picked_by", picker, filter, limit, offset).await
    }

    async fn history(
        pool: &PgPool,
        column: &str,
        user: Uuid,
        filter: &HistoryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Request>, i64), sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM requests_tb WHERE deleted_at IS NULL AND {column} = "
        ));
        query.push_bind(user);
        push_history_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(pool).await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT COUNT(*) FROM requests_tb WHERE deleted_at IS NULL AND {column} = "
        ));
        count.push_bind(user);
        push_history_filters(&mut count, filter);

        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        collect_requests(rows).map(|requests| (requests, total))
    }

    /// Created/picked totals for one vendor.
    pub async fn counts(pool: &PgPool, user: Uuid) -> Result<(i64, i64), sqlx::Error> {
        let created = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM requests_tb WHERE deleted_at IS NULL AND created_by = $1",
        )
        .bind(user)
        .fetch_one(pool)
        .await?;

        let picked = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM requests_tb WHERE deleted_at IS NULL AND picked_by = $1",
        )
        .bind(user)
        .fetch_one(pool)
        .await?;

        Ok((created, picked))
    }

    /// Full request listing for the admin console.
    pub async fn admin_all(
        pool: &PgPool,
        filter: &AdminFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Request>, i64), sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM requests_tb WHERE deleted_at IS NULL"
        ));
        push_admin_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let rows = query.build().fetch_all(pool).await?;

        let mut count: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM requests_tb WHERE deleted_at IS NULL");
        push_admin_filters(&mut count, filter);

        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        collect_requests(rows).map(|requests| (requests, total))
    }

    /// Request counts grouped by status (admin overview).
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(RequestStatus, i64)>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS total FROM requests_tb WHERE deleted_at IS NULL GROUP BY status",
        )
        .fetch_all(pool)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let status_id: i16 = row.get("status");
            let status =
                RequestStatus::from_id(status_id).ok_or_else(|| bad_code("status", status_id))?;
            counts.push((status, row.get::<i64, _>("total")));
        }

        Ok(counts)
    }
}

fn push_available_filters(query: &mut QueryBuilder<Postgres>, filter: &AvailableFilter) {
    if let Some(amount) = filter.amount {
        query.push(" AND amount = ");
        query.push_bind(amount);
    }
    if let Some(min_amount) = filter.min_amount {
        query.push(" AND amount >= ");
        query.push_bind(min_amount);
    }
    if let Some(kind) = filter.kind {
        query.push(" AND req_type = ");
        query.push_bind(kind.id());
    }
}

fn push_history_filters(query: &mut QueryBuilder<Postgres>, filter: &HistoryFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status.id());
    }
    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        query.push(" AND created_at BETWEEN ");
        query.push_bind(start);
        query.push(" AND ");
        query.push_bind(end);
    }
}

fn push_admin_filters(query: &mut QueryBuilder<Postgres>, filter: &AdminFilter) {
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status.id());
    }
    if let Some(kind) = filter.kind {
        query.push(" AND req_type = ");
        query.push_bind(kind.id());
    }
    if let Some(vendor_id) = filter.vendor_id {
        query.push(" AND (created_by = ");
        query.push_bind(vendor_id);
        query.push(" OR picked_by = ");
        query.push_bind(vendor_id);
        query.push(")");
    }
    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        query.push(" AND created_at BETWEEN ");
        query.push_bind(start);
        query.push(" AND ");
        query.push_bind(end);
    }
}

fn collect_requests(rows: Vec<PgRow>) -> Result<Vec<Request>, sqlx::Error> {
    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        requests.push(row_to_request(&row)?);
    }
    Ok(requests)
}

pub(crate) fn row_to_request(row: &PgRow) -> Result<Request, sqlx::Error> {
    let kind_id: i16 = row.get("req_type");
    let kind = RequestType::from_id(kind_id).ok_or_else(|| bad_code("req_type", kind_id))?;

    let status_id: i16 = row.get("status");
    let status = RequestStatus::from_id(status_id).ok_or_else(|| bad_code("status", status_id))?;

    let bank_details: Option<Json<BankDetails>> = row.get("bank_details");

    Ok(Request {
        id: row.get("request_id"),
        kind,
        amount: row.get("amount"),
        status,
        bank_details: bank_details.map(|j| j.0),
        upi_id: row.get("upi_id"),
        qr_code: row.get("qr_code"),
        paid_amount: row.get("paid_amount"),
        pending_amount: row.get("pending_amount"),
        rejection_reason: row.get("rejection_reason"),
        payment_failure_reason: row.get("payment_failure_reason"),
        cancellation_reason: row.get("cancellation_reason"),
        created_by: row.get("created_by"),
        picked_by: row.get("picked_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted_at: row.get("deleted_at"),
    })
}
