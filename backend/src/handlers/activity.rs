//! Farm activity and carbon accounting handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{CarbonSummary, WeeklyEmissions};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::activity::{CreateActivityInput, FarmActivity, DEFAULT_RECENT_LIMIT};
use crate::services::ActivityService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

fn activity_service(state: AppState) -> ActivityService {
    ActivityService::new(state.db, state.llm)
}

/// Log an activity; the carbon footprint is estimated on the way in
pub async fn create_activity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateActivityInput>,
) -> AppResult<(StatusCode, Json<FarmActivity>)> {
    let activity = activity_service(state)
        .create_activity(current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn list_farm_activities(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<Vec<FarmActivity>>> {
    let activities = activity_service(state)
        .list_for_farm(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(activities))
}

pub async fn recent_activities(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<FarmActivity>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let activities = activity_service(state)
        .recent_for_user(current_user.0.user_id, limit)
        .await?;
    Ok(Json(activities))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(activity_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    activity_service(state)
        .delete_activity(current_user.0.user_id, activity_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn carbon_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<CarbonSummary>> {
    let summary = activity_service(state)
        .carbon_summary(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(summary))
}

pub async fn weekly_emissions(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<WeeklyEmissions>> {
    let weekly = activity_service(state)
        .weekly_emissions(current_user.0.user_id)
        .await?;
    Ok(Json(weekly))
}
