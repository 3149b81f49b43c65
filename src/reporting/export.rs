//! CSV export of settlement transactions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{TransactionStatus, TransactionType};
use crate::store::bad_code;

/// One exported row: a posting joined with its vendor.
#[derive(Debug, Serialize)]
struct ExportRecord {
    transaction_id: Uuid,
    request_id: Uuid,
    vendor_name: String,
    vendor_email: String,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: Decimal,
    status: &'static str,
    created_at: String,
}

/// Render all postings in the range as CSV bytes, oldest first.
pub async fn export_transactions_csv(
    pool: &PgPool,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<u8>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT t.transaction_id, t.request_id, t.tx_type, t.amount, t.status, t.created_at,
               u.name AS vendor_name, u.email AS vendor_email
        FROM transactions_tb t
        JOIN users_tb u ON u.user_id = t.vendor_id
        WHERE ($1::timestamptz IS NULL OR t.created_at >= $1)
          AND ($2::timestamptz IS NULL OR t.created_at <= $2)
        ORDER BY t.created_at ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let mut writer = csv::Writer::from_writer(Vec::new());

    for row in rows {
        let kind_id: i16 = row.get("tx_type");
        let kind = TransactionType::from_id(kind_id).ok_or_else(|| bad_code("tx_type", kind_id))?;

        let status_id: i16 = row.get("status");
        let status =
            TransactionStatus::from_id(status_id).ok_or_else(|| bad_code("status", status_id))?;

        let created_at: DateTime<Utc> = row.get("created_at");

        let record = ExportRecord {
            transaction_id: row.get("transaction_id"),
            request_id: row.get("request_id"),
            vendor_name: row.get("vendor_name"),
            vendor_email: row.get("vendor_email"),
            kind: kind.as_str(),
            amount: row.get("amount"),
            status: match status {
                TransactionStatus::Completed => "COMPLETED",
            },
            created_at: created_at.to_rfc3339(),
        };

        writer
            .serialize(record)
            .map_err(|e| sqlx::Error::Decode(e.to_string().into()))?;
    }

    writer
        .into_inner()
        .map_err(|e| sqlx::Error::Decode(e.to_string().into()))
}
