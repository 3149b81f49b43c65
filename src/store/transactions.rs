//! Transaction repository. Postings are insert-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::bad_code;
use crate::domain::{Transaction, TransactionStatus, TransactionType};

/// Withdrawal/deposit sums for one vendor.
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorTotals {
    pub withdrawal: Decimal,
    pub deposit: Decimal,
}

impl VendorTotals {
    pub fn net(&self) -> Decimal {
        self.deposit - self.withdrawal
    }
}

/// One aggregation bucket (a month or a day, formatted upstream).
#[derive(Debug, Clone)]
pub struct PeriodTotals {
    pub period: String,
    pub withdrawal: Decimal,
    pub deposit: Decimal,
}

pub struct TransactionStore;

impl TransactionStore {
    /// Insert one posting.
    pub async fn insert(
        conn: &mut PgConnection,
        transaction: &Transaction,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO transactions_tb
                (transaction_id, request_id, vendor_id, tx_type, amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(transaction.id)
        .bind(transaction.request_id)
        .bind(transaction.vendor_id)
        .bind(transaction.kind.id())
        .bind(transaction.amount)
        .bind(transaction.status.id())
        .execute(conn)
        .await?;

        Ok(())
    }

    /// All postings for one request.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT transaction_id, request_id, vendor_id, tx_type, amount, status, created_at
            FROM transactions_tb
            WHERE request_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(pool)
        .await?;

        let mut transactions = Vec::with_capacity(rows.len());
        for row in rows {
            transactions.push(row_to_transaction(&row)?);
        }
        Ok(transactions)
    }

    /// Withdrawal/deposit sums for one vendor, optionally date-bounded.
    pub async fn totals_for_vendor(
        pool: &PgPool,
        vendor_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<VendorTotals, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE tx_type = $2), 0) AS withdrawal,
                COALESCE(SUM(amount) FILTER (WHERE tx_type = $3), 0) AS deposit
            FROM transactions_tb
            WHERE vendor_id = $1
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at <= $5)
            "#,
        )
        .bind(vendor_id)
        .bind(TransactionType::Withdrawal.id())
        .bind(TransactionType::Deposit.id())
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(VendorTotals {
            withdrawal: row.get("withdrawal"),
            deposit: row.get("deposit"),
        })
    }

    /// Sums per period for one vendor (or the whole system when `vendor_id`
    /// is None). `daily` buckets by day instead of month.
    pub async fn period_totals(
        pool: &PgPool,
        vendor_id: Option<Uuid>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        daily: bool,
    ) -> Result<Vec<PeriodTotals>, sqlx::Error> {
        let period_format = if daily { "YYYY-MM-DD" } else { "YYYY-MM" };

        let rows = sqlx::query(
            r#"
            SELECT
                TO_CHAR(created_at, $1) AS period,
                COALESCE(SUM(amount) FILTER (WHERE tx_type = $2), 0) AS withdrawal,
                COALESCE(SUM(amount) FILTER (WHERE tx_type = $3), 0) AS deposit
            FROM transactions_tb
            WHERE ($4::uuid IS NULL OR vendor_id = $4)
              AND ($5::timestamptz IS NULL OR created_at >= $5)
              AND ($6::timestamptz IS NULL OR created_at <= $6)
            GROUP BY period
            ORDER BY period ASC
            "#,
        )
        .bind(period_format)
        .bind(TransactionType::Withdrawal.id())
        .bind(TransactionType::Deposit.id())
        .bind(vendor_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PeriodTotals {
                period: row.get("period"),
                withdrawal: row.get("withdrawal"),
                deposit: row.get("deposit"),
            })
            .collect())
    }

    /// Grouped sums for a set of vendors in one query.
    pub async fn totals_for_vendors(
        pool: &PgPool,
        vendor_ids: &[Uuid],
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Uuid, VendorTotals)>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                vendor_id,
                COALESCE(SUM(amount) FILTER (WHERE tx_type = $2), 0) AS withdrawal,
                COALESCE(SUM(amount) FILTER (WHERE tx_type = $3), 0) AS deposit
            FROM transactions_tb
            WHERE vendor_id = ANY($1)
              AND ($4::timestamptz IS NULL OR created_at >= $4)
              AND ($5::timestamptz IS NULL OR created_at <= $5)
            GROUP BY vendor_id
            "#,
        )
        .bind(vendor_ids)
        .bind(TransactionType::Withdrawal.id())
        .bind(TransactionType::Deposit.id())
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.get("vendor_id"),
                    VendorTotals {
                        withdrawal: row.get("withdrawal"),
                        deposit: row.get("deposit"),
                    },
                )
            })
            .collect())
    }

    /// Total settled volume (each settlement posts one deposit, so summing
    /// one side counts every request once).
    pub async fn settled_volume(pool: &PgPool) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions_tb WHERE tx_type = $1",
        )
        .bind(TransactionType::Deposit.id())
        .fetch_one(pool)
        .await
    }
}

pub(crate) fn row_to_transaction(row: &PgRow) -> Result<Transaction, sqlx::Error> {
    let kind_id: i16 = row.get("tx_type");
    let kind = TransactionType::from_id(kind_id).ok_or_else(|| bad_code("tx_type", kind_id))?;

    let status_id: i16 = row.get("status");
    let status =
        TransactionStatus::from_id(status_id).ok_or_else(|| bad_code("status", status_id))?;

    Ok(Transaction {
        id: row.get("transaction_id"),
        request_id: row.get("request_id"),
        vendor_id: row.get("vendor_id"),
        kind,
        amount: row.get("amount"),
        status,
        created_at: row.get("created_at"),
    })
}
