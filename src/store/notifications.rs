//! Notification repository.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::bad_code;
use crate::domain::{Notification, NotificationKind};

pub struct NotificationStore;

impl NotificationStore {
    /// Insert one notification. Runs on the pool, outside lifecycle
    /// transactions: delivery is best-effort.
    pub async fn insert(pool: &PgPool, notification: &Notification) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications_tb
                (notification_id, user_id, message, kind, is_read, request_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.message)
        .bind(notification.kind.id())
        .bind(notification.is_read)
        .bind(notification.request_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Notifications for one user, newest first. `unread_only` restricts to
    /// unread rows.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Notification>, i64), sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT notification_id, user_id, message, kind, is_read, request_id, created_at
            FROM notifications_tb
            WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notifications_tb
            WHERE user_id = $1 AND ($2 = FALSE OR is_read = FALSE)
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(pool)
        .await?;

        let mut notifications = Vec::with_capacity(rows.len());
        for row in rows {
            notifications.push(row_to_notification(&row)?);
        }

        Ok((notifications, total))
    }

    /// Unread count for the badge.
    pub async fn unread_count(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications_tb WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark one of the user's notifications read.
    pub async fn mark_read(
        pool: &PgPool,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications_tb SET is_read = TRUE WHERE notification_id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Mark all of the user's notifications read; returns how many flipped.
    pub async fn mark_all_read(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications_tb SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn row_to_notification(row: &PgRow) -> Result<Notification, sqlx::Error> {
    let kind_id: i16 = row.get("kind");
    let kind = NotificationKind::from_id(kind_id).ok_or_else(|| bad_code("kind", kind_id))?;

    Ok(Notification {
        id: row.get("notification_id"),
        user_id: row.get("user_id"),
        message: row.get("message"),
        kind,
        is_read: row.get("is_read"),
        request_id: row.get("request_id"),
        created_at: row.get("created_at"),
    })
}
