//! Payment slip repository. Append-only.

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::domain::PaymentSlip;

pub struct SlipStore;

impl SlipStore {
    /// Append one slip.
    pub async fn insert(conn: &mut PgConnection, slip: &PaymentSlip) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO payment_slips_tb
                (slip_id, request_id, uploaded_by, amount, evidence_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(slip.id)
        .bind(slip.request_id)
        .bind(slip.uploaded_by)
        .bind(slip.amount)
        .bind(&slip.evidence_ref)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Slips for one request, newest first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Vec<PaymentSlip>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT slip_id, request_id, uploaded_by, amount, evidence_ref, created_at
            FROM payment_slips_tb
            WHERE request_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.iter().map(row_to_slip).collect())
    }

    /// One slip scoped to its request.
    pub async fn get(
        pool: &PgPool,
        request_id: Uuid,
        slip_id: Uuid,
    ) -> Result<Option<PaymentSlip>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT slip_id, request_id, uploaded_by, amount, evidence_ref, created_at
            FROM payment_slips_tb
            WHERE slip_id = $1 AND request_id = $2
            "#,
        )
        .bind(slip_id)
        .bind(request_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.as_ref().map(row_to_slip))
    }
}

fn row_to_slip(row: &PgRow) -> PaymentSlip {
    PaymentSlip {
        id: row.get("slip_id"),
        request_id: row.get("request_id"),
        uploaded_by: row.get("uploaded_by"),
        amount: row.get("amount"),
        evidence_ref: row.get("evidence_ref"),
        created_at: row.get("created_at"),
    }
}
