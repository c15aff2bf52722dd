//! Community forum service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Milestone, Pagination};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::badge_award::BadgeCoordinator;
use crate::services::notification::{reply_message, NotificationService};

/// Forum service
#[derive(Clone)]
pub struct ForumService {
    db: PgPool,
}

/// Public view of a thread or post author
#[derive(Debug, Clone, Serialize)]
pub struct ForumUser {
    pub id: Uuid,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForumThread {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: ForumUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForumPost {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub owner: ForumUser,
}

/// Thread with its replies, oldest reply first
#[derive(Debug, Serialize)]
pub struct ThreadWithPosts {
    #[serde(flatten)]
    pub thread: ForumThread,
    pub posts: Vec<ForumPost>,
}

#[derive(Debug, sqlx::FromRow)]
struct ThreadRow {
    id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_full_name: Option<String>,
}

impl From<ThreadRow> for ForumThread {
    fn from(row: ThreadRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            owner: ForumUser {
                id: row.owner_id,
                full_name: row.owner_full_name,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    thread_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_full_name: Option<String>,
}

impl From<PostRow> for ForumPost {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            thread_id: row.thread_id,
            content: row.content,
            created_at: row.created_at,
            owner: ForumUser {
                id: row.owner_id,
                full_name: row.owner_full_name,
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateThreadInput {
    #[validate(length(min = 3, max = 150, message = "Title must be 3 to 150 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    pub thread_id: Uuid,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: String,
}

const THREAD_SELECT: &str = r#"
    SELECT t.id, t.title, t.content, t.created_at, t.owner_id, u.full_name AS owner_full_name
    FROM forum_threads t
    JOIN users u ON u.id = t.owner_id
"#;

const POST_SELECT: &str = r#"
    SELECT p.id, p.thread_id, p.content, p.created_at, p.owner_id, u.full_name AS owner_full_name
    FROM forum_posts p
    JOIN users u ON u.id = p.owner_id
"#;

impl ForumService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_thread(&self, owner_id: Uuid, input: CreateThreadInput) -> AppResult<ForumThread> {
        input.validate()?;

        let thread_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO forum_threads (owner_id, title, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.content)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(thread_id = %thread_id, owner_id = %owner_id, "Forum thread created");

        self.record_thread_milestone(owner_id).await;

        self.find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::Internal("thread missing after insert".to_string()))
    }

    async fn record_thread_milestone(&self, owner_id: Uuid) {
        let thread_count =
            match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM forum_threads WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.db)
                .await
            {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!(user_id = %owner_id, "Failed to count threads for badges: {}", e);
                    return;
                }
            };

        BadgeCoordinator::new(self.db.clone())
            .record_milestone(owner_id, Milestone::ForumThreadCreated { thread_count })
            .await;
    }

    async fn find_thread(&self, thread_id: Uuid) -> AppResult<Option<ForumThread>> {
        let row = sqlx::query_as::<_, ThreadRow>(&format!("{} WHERE t.id = $1", THREAD_SELECT))
            .bind(thread_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(ForumThread::from))
    }

    /// Threads, newest first
    pub async fn list_threads(&self, page: Pagination) -> AppResult<Vec<ForumThread>> {
        let page = page.normalized();

        let rows = sqlx::query_as::<_, ThreadRow>(&format!(
            "{} ORDER BY t.created_at DESC OFFSET $1 LIMIT $2",
            THREAD_SELECT
        ))
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ForumThread::from).collect())
    }

    pub async fn get_thread(&self, thread_id: Uuid) -> AppResult<ThreadWithPosts> {
        let thread = self
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread".to_string()))?;

        let posts = sqlx::query_as::<_, PostRow>(&format!(
            "{} WHERE p.thread_id = $1 ORDER BY p.created_at ASC",
            POST_SELECT
        ))
        .bind(thread_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ThreadWithPosts {
            thread,
            posts: posts.into_iter().map(ForumPost::from).collect(),
        })
    }

    /// Reply to a thread, notifying its owner when someone else replies
    pub async fn create_post(&self, owner_id: Uuid, input: CreatePostInput) -> AppResult<ForumPost> {
        input.validate()?;

        let thread = self
            .find_thread(input.thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread".to_string()))?;

        let post_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO forum_posts (thread_id, owner_id, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(thread.id)
        .bind(owner_id)
        .bind(&input.content)
        .fetch_one(&self.db)
        .await?;

        let post = sqlx::query_as::<_, PostRow>(&format!("{} WHERE p.id = $1", POST_SELECT))
            .bind(post_id)
            .fetch_one(&self.db)
            .await
            .map(ForumPost::from)?;

        if thread.owner.id != owner_id {
            if let Err(e) = self.notify_thread_owner(&thread, &post).await {
                tracing::error!(post_id = %post.id, "Failed to notify thread owner: {}", e);
            }
        }

        Ok(post)
    }

    async fn notify_thread_owner(&self, thread: &ForumThread, post: &ForumPost) -> AppResult<()> {
        let (email, full_name) = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT email, full_name FROM users WHERE id = $1",
        )
        .bind(post.owner.id)
        .fetch_one(&self.db)
        .await?;

        let replier = full_name.filter(|n| !n.trim().is_empty()).unwrap_or(email);

        NotificationService::new(self.db.clone())
            .create(thread.owner.id, &reply_message(&replier, &thread.title), Some(post.id))
            .await?;

        Ok(())
    }
}
