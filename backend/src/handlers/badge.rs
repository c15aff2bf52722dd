//! Badge handlers

use axum::{
    extract::{Path, State},
    Json,
};
use shared::Badge;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::badge::{BadgeCount, EarnedBadge};
use crate::services::BadgeService;
use crate::AppState;

/// All configured badges (public)
pub async fn list_badges(State(state): State<AppState>) -> AppResult<Json<Vec<Badge>>> {
    let service = BadgeService::new(state.db);
    Ok(Json(service.list_badges().await?))
}

pub async fn my_badges(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<EarnedBadge>>> {
    let service = BadgeService::new(state.db);
    Ok(Json(service.user_badges(current_user.0.user_id).await?))
}

pub async fn my_badge_count(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<BadgeCount>> {
    let service = BadgeService::new(state.db);
    Ok(Json(service.count_user_badges(current_user.0.user_id).await?))
}

/// Award a badge by name without checking its condition
pub async fn award_test(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(badge_name): Path<String>,
) -> AppResult<Json<EarnedBadge>> {
    let service = BadgeService::new(state.db);
    Ok(Json(service.award_test(current_user.0.user_id, &badge_name).await?))
}
