//! Notification emitter.
//!
//! Runs after a lifecycle transition commits. Emission is best-effort: a
//! failed insert is logged and dropped, never escalated, and can never roll
//! back the transition that produced it. The super admin recipient is
//! resolved by role query at emit time so an admin change takes effect
//! immediately.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Notification;
use crate::engine::{Notice, Recipient};
use crate::store::{NotificationStore, UserStore};

pub struct Notifier;

impl Notifier {
    /// Emit every notice from a committed transition.
    pub async fn emit_all(pool: &PgPool, notices: &[Notice]) {
        for notice in notices {
            Self::emit(pool, notice).await;
        }
    }

    async fn emit(pool: &PgPool, notice: &Notice) {
        let user_id = match &notice.recipient {
            Recipient::User(id) => *id,
            Recipient::SuperAdmin => match UserStore::find_super_admin(pool).await {
                Ok(Some(admin)) => admin.id,
                Ok(None) => {
                    tracing::warn!("No super admin configured, dropping admin notification");
                    return;
                }
                Err(e) => {
                    tracing::warn!("Super admin lookup failed, dropping notification: {}", e);
                    return;
                }
            },
        };

        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            message: notice.message.clone(),
            kind: notice.kind,
            is_read: false,
            request_id: notice.request_id,
            created_at: chrono::Utc::now(),
        };

        if let Err(e) = NotificationStore::insert(pool, &notification).await {
            tracing::warn!(
                user_id = %user_id,
                "Failed to emit notification, dropping: {}",
                e
            );
        }
    }
}
