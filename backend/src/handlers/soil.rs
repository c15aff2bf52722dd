//! Soil report handlers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use shared::CropSuggestionSummary;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::soil::{CreateSoilReportInput, SoilImageUpload, SoilReport};
use crate::services::SoilService;
use crate::AppState;

fn soil_service(state: AppState) -> SoilService {
    SoilService::new(state.db, state.llm)
}

/// Create a report from manual readings
pub async fn create_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSoilReportInput>,
) -> AppResult<(StatusCode, Json<SoilReport>)> {
    let report = soil_service(state).create_report(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Create a report from an uploaded soil photo.
///
/// Expects multipart fields `farm_id` and `file`.
pub async fn create_image_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<SoilReport>)> {
    let mut farm_id = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("farm_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid farm_id field: {}", e)))?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::validation("farm_id", "farm_id must be a UUID"))?;
                farm_id = Some(id);
            }
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid file field: {}", e)))?;
                image = Some((content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let farm_id = farm_id.ok_or_else(|| AppError::validation("farm_id", "farm_id is required"))?;
    let (content_type, bytes) = image.ok_or_else(|| AppError::validation("file", "file is required"))?;

    let report = soil_service(state)
        .create_image_report(
            current_user.0.user_id,
            SoilImageUpload {
                farm_id,
                content_type,
                bytes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn list_farm_reports(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(farm_id): Path<Uuid>,
) -> AppResult<Json<Vec<SoilReport>>> {
    let reports = soil_service(state)
        .list_for_farm(current_user.0.user_id, farm_id)
        .await?;
    Ok(Json(reports))
}

pub async fn suggestion_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<CropSuggestionSummary>> {
    let summary = soil_service(state)
        .suggestion_summary(current_user.0.user_id)
        .await?;
    Ok(Json(summary))
}
