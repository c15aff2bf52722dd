//! Notification service for in-app notifications
//!
//! Notifications are created as side effects of forum activity and read
//! through the notifications endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::Pagination;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Notification service for managing notifications
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

/// In-app notification
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub post_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Unread notification count
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

/// Message shown to a thread owner when someone replies
pub fn reply_message(replier_name: &str, thread_title: &str) -> String {
    format!("{} replied to your thread '{}'.", replier_name, thread_title)
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a notification for a user
    pub async fn create(
        &self,
        user_id: Uuid,
        message: &str,
        post_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message, post_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, message, is_read, post_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(post_id)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    /// List a user's notifications, newest first
    pub async fn list(
        &self,
        user_id: Uuid,
        page: Pagination,
        include_read: bool,
    ) -> AppResult<Vec<Notification>> {
        let page = page.normalized();

        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, message, is_read, post_id, created_at
            FROM notifications
            WHERE user_id = $1 AND ($2 OR is_read = false)
            ORDER BY created_at DESC
            OFFSET $3
            LIMIT $4
            "#,
        )
        .bind(user_id)
        .bind(include_read)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    /// Get unread notification count
    pub async fn unread_count(&self, user_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark one notification as read
    pub async fn mark_as_read(&self, user_id: Uuid, notification_id: Uuid) -> AppResult<()> {
        let owner_id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM notifications WHERE id = $1")
            .bind(notification_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification".to_string()))?;

        if owner_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to modify this notification".to_string(),
            ));
        }

        sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND is_read = false")
            .bind(notification_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Mark all of a user's notifications as read
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE user_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        tracing::info!(
            user_id = %user_id,
            updated = result.rows_affected(),
            "Marked notifications as read"
        );

        Ok(result.rows_affected())
    }
}
