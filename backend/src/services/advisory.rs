//! Climate action advice
//!
//! Each report runs the rule engine first, then asks the model to refine the
//! result. When the model is unavailable or answers badly the rule output is
//! turned into a static response instead.

use serde::Serialize;
use shared::{
    assess_carbon_trend, assess_pest_disease_risk, assess_water_stress, CarbonGuidance,
    CarbonTrend, DailyWeatherSeries, Milestone, PestAlert, PestAlertList, RiskAssessment,
    WaterAdvice, WaterStressLevel, MAX_REPORTED_RISKS,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::{ChatMessage, LlmClient, WeatherClient};
use crate::services::activity::ActivityService;
use crate::services::badge_award::BadgeCoordinator;
use crate::services::climate::fetch_farm_forecast;
use crate::services::farm::{find_owned_farm, Farm};

/// Activities considered for carbon guidance
const CARBON_GUIDANCE_ACTIVITIES: i64 = 10;

const PEST_PARAMS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "relative_humidity_2m_mean",
];

const WATER_PARAMS: &[&str] = &["precipitation_sum", "et0_fao_evapotranspiration"];

/// Where a report's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceSource {
    Model,
    Rules,
}

#[derive(Debug, Serialize)]
pub struct PestAlertReport {
    pub farm_id: Uuid,
    pub risk_assessment: RiskAssessment,
    pub alerts: Vec<PestAlert>,
    pub source: AdviceSource,
}

#[derive(Debug, Serialize)]
pub struct CarbonGuidanceReport {
    pub farm_id: Uuid,
    pub carbon_trend: CarbonTrend,
    pub guidance: CarbonGuidance,
    pub source: AdviceSource,
}

#[derive(Debug, Serialize)]
pub struct WaterAdviceReport {
    pub farm_id: Uuid,
    pub water_stress: WaterStressLevel,
    pub advice: WaterAdvice,
    pub source: AdviceSource,
}

/// Climate action advisory service
#[derive(Clone)]
pub struct AdvisoryService {
    db: PgPool,
    weather: WeatherClient,
    llm: LlmClient,
}

fn crop_sentence(farm: &Farm) -> String {
    match farm.current_crop.as_deref() {
        Some(crop) if !crop.trim().is_empty() => format!("The farm is growing: {}.", crop),
        _ => "The farm grows various crops.".to_string(),
    }
}

fn pest_prompt(farm: &Farm, assessment: &RiskAssessment) -> String {
    let risks = serde_json::to_string(assessment).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an AI agronomist advising a Kenyan farmer. {}\n\
         A basic analysis suggests the following pest/disease risks for the next 7 days based on weather:\n\
         {}\n\n\
         Refine this assessment. Provide ONLY a valid JSON object with a key \"alerts\" which is a list. \
         For each significant risk (prioritize 'High' or 'Medium'), provide: \"type\" (Pest/Disease), \
         \"name\", \"risk_level\" (Low/Medium/High), and concise, actionable \"advice\" suitable for a \
         smallholder farmer in Kenya. Limit to the top {} most relevant alerts.",
        crop_sentence(farm),
        risks,
        MAX_REPORTED_RISKS
    )
}

fn carbon_prompt(farm: &Farm, activity_summary: &str, trend: CarbonTrend) -> String {
    format!(
        "You are an AI agronomist advising a Kenyan farmer on soil carbon.\n\
         Farm Details: Crop={}, Recent Activities Summary={}.\n\
         A basic assessment based on recent activities suggests the carbon trend is: \"{}\".\n\n\
         Provide guidance. Return ONLY a valid JSON object with two keys:\n\
         1. \"estimated_current_seq_rate\": A refined qualitative estimate (e.g., \"Low, potential to improve\", \"Moderate\").\n\
         2. \"recommendations\": A list of 3 specific, actionable soil carbon improvement recommendations \
         relevant to Kenyan smallholder farming, considering the basic trend assessment.",
        farm.current_crop.as_deref().unwrap_or("N/A"),
        activity_summary,
        trend
    )
}

fn water_prompt(farm: &Farm, level: WaterStressLevel, series: &DailyWeatherSeries) -> String {
    let snippet = serde_json::to_string(series).unwrap_or_else(|_| "{}".to_string());
    format!(
        "You are an AI agronomist advising a Kenyan farmer on water management. {}\n\
         A basic analysis suggests the water stress level for the next 7 days is: \"{}\".\n\
         Weather Forecast Snippet: {}\n\n\
         Provide advice based on the assessment and forecast. Return ONLY a valid JSON object with three keys:\n\
         1. \"next_7_days_outlook\": A brief (1 sentence) summary based on the assessment.\n\
         2. \"irrigation_advice\": One specific, actionable irrigation tip for the week.\n\
         3. \"tips\": A list of 2 short, practical water-saving tips relevant to the assessment.",
        crop_sentence(farm),
        level,
        snippet
    )
}

/// Distinct activity types, in first-seen order
fn activity_summary<'a>(types: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for t in types {
        if !seen.contains(&t) {
            seen.push(t);
        }
    }
    if seen.is_empty() {
        "no activities logged".to_string()
    } else {
        seen.join(", ")
    }
}

impl AdvisoryService {
    pub fn new(db: PgPool, weather: WeatherClient, llm: LlmClient) -> Self {
        Self { db, weather, llm }
    }

    /// Pest and disease alerts for the coming week
    pub async fn pest_alerts(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<PestAlertReport> {
        let farm = find_owned_farm(&self.db, user_id, farm_id).await?;
        let forecast = fetch_farm_forecast(&self.weather, &farm, PEST_PARAMS).await?;
        let assessment = assess_pest_disease_risk(&DailyWeatherSeries::from_forecast(&forecast));

        let (alerts, source) = if assessment.is_empty() {
            (Vec::new(), AdviceSource::Rules)
        } else {
            let messages = vec![ChatMessage::user(pest_prompt(&farm, &assessment))];
            match self.llm.complete_json::<PestAlertList>(messages).await {
                Ok(mut reply) => {
                    reply.alerts.truncate(MAX_REPORTED_RISKS);
                    (reply.alerts, AdviceSource::Model)
                }
                Err(e) => {
                    tracing::warn!(farm_id = %farm_id, "Pest alert refinement failed, using rules: {}", e);
                    (shared::fallback_pest_alerts(&assessment), AdviceSource::Rules)
                }
            }
        };

        BadgeCoordinator::new(self.db.clone())
            .record_milestone(user_id, Milestone::PestAlertViewed)
            .await;

        Ok(PestAlertReport {
            farm_id,
            risk_assessment: assessment,
            alerts,
            source,
        })
    }

    /// Soil carbon guidance from the farm's recent activities
    pub async fn carbon_guidance(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<CarbonGuidanceReport> {
        let farm = find_owned_farm(&self.db, user_id, farm_id).await?;
        let activities = ActivityService::new(self.db.clone(), self.llm.clone())
            .recent_for_farm(farm_id, Some(CARBON_GUIDANCE_ACTIVITIES))
            .await?;

        let trend = assess_carbon_trend(&activities);
        let summary = activity_summary(activities.iter().map(|a| a.activity_type.as_str()));
        let messages = vec![ChatMessage::user(carbon_prompt(&farm, &summary, trend))];

        let (guidance, source) = match self.llm.complete_json::<CarbonGuidance>(messages).await {
            Ok(guidance) => (guidance, AdviceSource::Model),
            Err(e) => {
                tracing::warn!(farm_id = %farm_id, "Carbon guidance refinement failed, using rules: {}", e);
                (shared::fallback_carbon_guidance(trend), AdviceSource::Rules)
            }
        };

        Ok(CarbonGuidanceReport {
            farm_id,
            carbon_trend: trend,
            guidance,
            source,
        })
    }

    /// Irrigation advice from the forecast water balance
    pub async fn water_advice(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<WaterAdviceReport> {
        let farm = find_owned_farm(&self.db, user_id, farm_id).await?;
        let forecast = fetch_farm_forecast(&self.weather, &farm, WATER_PARAMS).await?;
        let series = DailyWeatherSeries::from_forecast(&forecast);
        let level = assess_water_stress(&series);

        let messages = vec![ChatMessage::user(water_prompt(&farm, level, &series))];
        let (advice, source) = match self.llm.complete_json::<WaterAdvice>(messages).await {
            Ok(advice) => (advice, AdviceSource::Model),
            Err(e) => {
                tracing::warn!(farm_id = %farm_id, "Water advice refinement failed, using rules: {}", e);
                (shared::fallback_water_advice(level), AdviceSource::Rules)
            }
        };

        Ok(WaterAdviceReport {
            farm_id,
            water_stress: level,
            advice,
            source,
        })
    }
}
