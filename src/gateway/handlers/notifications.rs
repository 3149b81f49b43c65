//! Notification surface: listing and read-state toggling.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
};
use serde::Serialize;
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, PageQuery, Paginated, ok};
use crate::auth::AuthenticatedUser;
use crate::domain::Notification;
use crate::store::NotificationStore;

#[derive(Debug, Serialize)]
pub struct NotificationPage {
    #[serde(flatten)]
    pub notifications: Paginated<Notification>,
    pub unread_count: i64,
}

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult<NotificationPage> {
    let (page_no, limit, offset) = page.resolve();

    let (notifications, total) =
        NotificationStore::list_for_user(state.pool(), user.id, false, limit, offset).await?;
    let unread_count = NotificationStore::unread_count(state.pool(), user.id).await?;

    ok(NotificationPage {
        notifications: Paginated::new(notifications, total, page_no, limit),
        unread_count,
    })
}

/// GET /api/v1/notifications/unread
pub async fn unread(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Paginated<Notification>> {
    let (page_no, limit, offset) = page.resolve();

    let (notifications, total) =
        NotificationStore::list_for_user(state.pool(), user.id, true, limit, offset).await?;

    ok(Paginated::new(notifications, total, page_no, limit))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<UnreadCount> {
    let count = NotificationStore::unread_count(state.pool(), user.id).await?;
    ok(UnreadCount { count })
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<()> {
    let updated = NotificationStore::mark_read(state.pool(), user.id, notification_id).await?;
    if !updated {
        return ApiError::not_found("Notification not found").into_err();
    }
    ok(())
}

#[derive(Debug, Serialize)]
pub struct MarkAllResponse {
    pub updated: u64,
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<MarkAllResponse> {
    let updated = NotificationStore::mark_all_read(state.pool(), user.id).await?;
    ok(MarkAllResponse { updated })
}
