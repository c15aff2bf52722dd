//! Forum handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::Pagination;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::forum::{CreatePostInput, CreateThreadInput, ForumPost, ForumThread, ThreadWithPosts};
use crate::services::ForumService;
use crate::AppState;

pub async fn create_thread(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateThreadInput>,
) -> AppResult<(StatusCode, Json<ForumThread>)> {
    let service = ForumService::new(state.db);
    let thread = service.create_thread(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

/// List threads, newest first (public)
pub async fn list_threads(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<ForumThread>>> {
    let service = ForumService::new(state.db);
    Ok(Json(service.list_threads(page).await?))
}

/// Get a thread with its replies (public)
pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> AppResult<Json<ThreadWithPosts>> {
    let service = ForumService::new(state.db);
    Ok(Json(service.get_thread(thread_id).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePostInput>,
) -> AppResult<(StatusCode, Json<ForumPost>)> {
    let service = ForumService::new(state.db);
    let post = service.create_post(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}
