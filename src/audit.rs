//! Audit logger.
//!
//! One immutable `request_logs` row per lifecycle transition, written in
//! the same transaction as the transition itself. Rows are never updated or
//! deleted; the trail reads newest-first.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::RequestLog;
use crate::engine::LogDraft;
use crate::store::LogStore;

pub struct AuditLogger;

impl AuditLogger {
    /// Append one entry inside the caller's transaction.
    pub async fn append(conn: &mut PgConnection, draft: &LogDraft) -> Result<(), sqlx::Error> {
        let log = RequestLog {
            id: Uuid::new_v4(),
            request_id: draft.request_id,
            actor_id: draft.actor_id,
            action: draft.action,
            comment: Some(draft.comment.clone()),
            metadata: Some(draft.metadata.clone()),
            created_at: chrono::Utc::now(),
        };

        LogStore::append(conn, &log).await
    }

    /// Audit trail for one request, newest first.
    pub async fn trail(pool: &PgPool, request_id: Uuid) -> Result<Vec<RequestLog>, sqlx::Error> {
        LogStore::list_for_request(pool, request_id).await
    }
}
