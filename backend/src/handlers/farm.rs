//! Farm management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::farm::{CreateFarmInput, Farm, UpdateFarmInput};
use crate::services::FarmService;
use crate::AppState;

fn farm_service(state: AppState) -> FarmService {
    FarmService::new(state.db, state.geocoder)
}

/// Create a new farm
pub async fn create_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateFarmInput>,
) -> AppResult<(StatusCode, Json<Farm>)> {
    let farm = farm_service(state).create_farm(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

/// List the current user's farms
pub async fn list_farms(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Farm>>> {
    Ok(Json(farm_service(state).list_farms(current_user.0.user_id).await?))
}

pub async fn get_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<Farm>> {
    Ok(Json(farm_service(state).get_farm(current_user.0.user_id, farm_id).await?))
}

pub async fn update_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
    Json(input): Json<UpdateFarmInput>,
) -> AppResult<Json<Farm>> {
    let farm = farm_service(state)
        .update_farm(current_user.0.user_id, farm_id, input)
        .await?;
    Ok(Json(farm))
}

pub async fn delete_farm(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    farm_service(state).delete_farm(current_user.0.user_id, farm_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
