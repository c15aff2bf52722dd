//! Soil report analysis service
//!
//! Manual readings and soil photos are sent to the agronomy model, which
//! returns a written analysis and a list of suitable crops.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{CropSuggestionSummary, Milestone, SoilAnalysis};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{ChatMessage, LlmClient};
use crate::services::badge_award::BadgeCoordinator;
use crate::services::farm::find_owned_farm;

const AGRONOMIST_PROMPT: &str = "You are an expert Kenyan agronomist providing advice.";

const SOIL_SCIENTIST_PROMPT: &str =
    "You are an expert soil scientist specializing in Kenyan agriculture analyzing a soil image.";

const IMAGE_INSTRUCTIONS: &str = "Based on the attached soil image from a Kenyan farm:\n\
    1. Identify the likely soil type (e.g., Clay, Loam, Sandy, Red Lateritic, Black Cotton Soil).\n\
    2. Analyze its probable characteristics (drainage, water retention, fertility).\n\
    3. Suggest suitable crops for this soil type in Kenya.\n\n\
    Return ONLY a valid JSON object with two keys:\n\
    - \"ai_analysis_text\": String with identification and analysis.\n\
    - \"suggested_crops\": JSON list of crop names.";

/// Soil service
#[derive(Clone)]
pub struct SoilService {
    db: PgPool,
    llm: LlmClient,
}

/// Stored soil report
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SoilReport {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub date: DateTime<Utc>,
    pub ph: Option<Decimal>,
    pub nitrogen: Option<Decimal>,
    pub phosphorus: Option<Decimal>,
    pub potassium: Option<Decimal>,
    pub moisture: Option<Decimal>,
    pub ai_analysis_text: Option<String>,
    pub suggested_crops: Vec<String>,
}

/// Manually entered soil readings
#[derive(Debug, Deserialize)]
pub struct CreateSoilReportInput {
    pub farm_id: Uuid,
    pub ph: Option<Decimal>,
    pub nitrogen: Option<Decimal>,
    pub phosphorus: Option<Decimal>,
    pub potassium: Option<Decimal>,
    pub moisture: Option<Decimal>,
}

impl CreateSoilReportInput {
    fn validate(&self) -> AppResult<()> {
        if let Some(ph) = self.ph {
            shared::validate_soil_ph(ph).map_err(|msg| AppError::validation("ph", msg))?;
        }

        let measurements = [
            ("nitrogen", self.nitrogen),
            ("phosphorus", self.phosphorus),
            ("potassium", self.potassium),
            ("moisture", self.moisture),
        ];
        for (field, value) in measurements {
            if let Some(value) = value {
                shared::validate_soil_measurement(value).map_err(|msg| AppError::validation(field, msg))?;
            }
        }

        Ok(())
    }
}

/// Uploaded soil photo
#[derive(Debug)]
pub struct SoilImageUpload {
    pub farm_id: Uuid,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

fn reading(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "not measured".to_string())
}

fn manual_prompt(input: &CreateSoilReportInput) -> String {
    format!(
        "Analyze the following soil data for a farm in Kenya:\n\
         - pH: {}, Nitrogen (N): {} ppm, Phosphorus (P): {} ppm, Potassium (K): {} ppm, Moisture: {}%\n\
         Provide a concise analysis of the soil's health and a list of suitable crops.\n\
         Return ONLY a valid JSON object with keys \"ai_analysis_text\" (string) and \
         \"suggested_crops\" (list of strings).",
        reading(input.ph),
        reading(input.nitrogen),
        reading(input.phosphorus),
        reading(input.potassium),
        reading(input.moisture),
    )
}

/// Data URL for an uploaded image. Non-image content types are sent as JPEG.
fn image_data_url(content_type: Option<&str>, bytes: &[u8]) -> String {
    let mime = content_type
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or("image/jpeg");
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

const REPORT_COLUMNS: &str = "id, farm_id, date, ph, nitrogen, phosphorus, potassium, moisture, ai_analysis_text, suggested_crops";

impl SoilService {
    pub fn new(db: PgPool, llm: LlmClient) -> Self {
        Self { db, llm }
    }

    /// Analyze manual readings and store the report
    pub async fn create_report(&self, user_id: Uuid, input: CreateSoilReportInput) -> AppResult<SoilReport> {
        input.validate()?;
        find_owned_farm(&self.db, user_id, input.farm_id).await?;

        let analysis: SoilAnalysis = self
            .llm
            .complete_json(vec![
                ChatMessage::system(AGRONOMIST_PROMPT),
                ChatMessage::user(manual_prompt(&input)),
            ])
            .await?;

        let report = self
            .insert_report(
                input.farm_id,
                [input.ph, input.nitrogen, input.phosphorus, input.potassium, input.moisture],
                analysis,
            )
            .await?;

        self.record_soil_milestone(user_id).await;
        Ok(report)
    }

    /// Analyze a soil photo and store the report with zeroed readings
    pub async fn create_image_report(&self, user_id: Uuid, upload: SoilImageUpload) -> AppResult<SoilReport> {
        if upload.bytes.is_empty() {
            return Err(AppError::validation("file", "Image file is empty"));
        }
        find_owned_farm(&self.db, user_id, upload.farm_id).await?;

        let data_url = image_data_url(upload.content_type.as_deref(), &upload.bytes);
        let analysis: SoilAnalysis = self
            .llm
            .complete_json(vec![
                ChatMessage::system(SOIL_SCIENTIST_PROMPT),
                ChatMessage::user_with_image(IMAGE_INSTRUCTIONS, data_url),
            ])
            .await?;

        let report = self
            .insert_report(upload.farm_id, [Some(Decimal::ZERO); 5], analysis)
            .await?;

        self.record_soil_milestone(user_id).await;
        Ok(report)
    }

    async fn insert_report(
        &self,
        farm_id: Uuid,
        [ph, nitrogen, phosphorus, potassium, moisture]: [Option<Decimal>; 5],
        analysis: SoilAnalysis,
    ) -> AppResult<SoilReport> {
        let report = sqlx::query_as::<_, SoilReport>(&format!(
            r#"
            INSERT INTO soil_reports
                (farm_id, ph, nitrogen, phosphorus, potassium, moisture, ai_analysis_text, suggested_crops)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(farm_id)
        .bind(ph)
        .bind(nitrogen)
        .bind(phosphorus)
        .bind(potassium)
        .bind(moisture)
        .bind(&analysis.ai_analysis_text)
        .bind(&analysis.suggested_crops)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(report_id = %report.id, farm_id = %farm_id, "Soil report created");
        Ok(report)
    }

    async fn record_soil_milestone(&self, user_id: Uuid) {
        let report_count = match sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM soil_reports r
            JOIN farms f ON f.id = r.farm_id
            WHERE f.owner_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(user_id = %user_id, "Failed to count soil reports for badges: {}", e);
                return;
            }
        };

        BadgeCoordinator::new(self.db.clone())
            .record_milestone(user_id, Milestone::SoilReportCreated { report_count })
            .await;
    }

    /// Reports for one farm, newest first
    pub async fn list_for_farm(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<Vec<SoilReport>> {
        find_owned_farm(&self.db, user_id, farm_id).await?;

        let reports = sqlx::query_as::<_, SoilReport>(&format!(
            "SELECT {} FROM soil_reports WHERE farm_id = $1 ORDER BY date DESC",
            REPORT_COLUMNS
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// Unique crop suggestions across all of the user's farms
    pub async fn suggestion_summary(&self, user_id: Uuid) -> AppResult<CropSuggestionSummary> {
        let suggestions = sqlx::query_scalar::<_, Vec<String>>(
            r#"
            SELECT r.suggested_crops
            FROM soil_reports r
            JOIN farms f ON f.id = r.farm_id
            WHERE f.owner_id = $1
            ORDER BY r.date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(shared::summarize_crop_suggestions(suggestions))
    }
}
