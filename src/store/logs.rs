//! Request log repository. Append-only; rows are never updated or deleted.

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::bad_code;
use crate::domain::{LogAction, RequestLog};

pub struct LogStore;

impl LogStore {
    /// Append one audit entry.
    pub async fn append(conn: &mut PgConnection, log: &RequestLog) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO request_logs_tb
                (log_id, request_id, actor_id, action, comment, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(log.id)
        .bind(log.request_id)
        .bind(log.actor_id)
        .bind(log.action.id())
        .bind(&log.comment)
        .bind(&log.metadata)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Audit trail for one request, newest first.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Vec<RequestLog>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT log_id, request_id, actor_id, action, comment, metadata, created_at
            FROM request_logs_tb
            WHERE request_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(pool)
        .await?;

        let mut logs = Vec::with_capacity(rows.len());
        for row in rows {
            logs.push(row_to_log(&row)?);
        }
        Ok(logs)
    }
}

fn row_to_log(row: &PgRow) -> Result<RequestLog, sqlx::Error> {
    let action_id: i16 = row.get("action");
    let action = LogAction::from_id(action_id).ok_or_else(|| bad_code("action", action_id))?;

    Ok(RequestLog {
        id: row.get("log_id"),
        request_id: row.get("request_id"),
        actor_id: row.get("actor_id"),
        action,
        comment: row.get("comment"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
    })
}
