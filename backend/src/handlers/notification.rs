//! HTTP handlers for notification endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::Pagination;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::notification::{Notification, UnreadCount};
use crate::services::NotificationService;
use crate::AppState;

/// Query parameters for listing notifications
#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub include_read: bool,
}

impl ListNotificationsQuery {
    fn page(&self) -> Pagination {
        let default = Pagination::default();
        Pagination {
            skip: self.skip.unwrap_or(default.skip),
            limit: self.limit.unwrap_or(default.limit),
        }
    }
}

/// List notifications, unread only unless `include_read=true`
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListNotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let service = NotificationService::new(state.db);
    let notifications = service
        .list(current_user.0.user_id, query.page(), query.include_read)
        .await?;
    Ok(Json(notifications))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<UnreadCount>> {
    let service = NotificationService::new(state.db);
    let unread_count = service.unread_count(current_user.0.user_id).await?;
    Ok(Json(UnreadCount { unread_count }))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = NotificationService::new(state.db);
    service
        .mark_as_read(current_user.0.user_id, notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_as_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<StatusCode> {
    let service = NotificationService::new(state.db);
    service.mark_all_as_read(current_user.0.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
