//! Weather forecast and climate action handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::advisory::{CarbonGuidanceReport, PestAlertReport, WaterAdviceReport};
use crate::services::climate::FarmForecast;
use crate::services::{AdvisoryService, ClimateService};
use crate::AppState;

fn advisory_service(state: AppState) -> AdvisoryService {
    AdvisoryService::new(state.db, state.weather, state.llm)
}

/// Full daily forecast for a farm
pub async fn get_forecast(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<FarmForecast>> {
    let service = ClimateService::new(state.db, state.weather);
    Ok(Json(service.forecast(current_user.0.user_id, farm_id).await?))
}

pub async fn get_pest_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<PestAlertReport>> {
    let report = advisory_service(state)
        .pest_alerts(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(report))
}

pub async fn get_carbon_guidance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<CarbonGuidanceReport>> {
    let report = advisory_service(state)
        .carbon_guidance(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(report))
}

pub async fn get_water_advice(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<WaterAdviceReport>> {
    let report = advisory_service(state)
        .water_advice(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(report))
}
