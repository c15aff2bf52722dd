//! Farm activity logging and carbon accounting

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{ActivityRecord, CarbonSummary, WeeklyEmissions};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::{ChatMessage, LlmClient};
use crate::services::farm::find_owned_farm;

/// Estimate reported when the model answers in an unexpected shape
const MALFORMED_ESTIMATE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Default number of activities in the recent feed
pub const DEFAULT_RECENT_LIMIT: i64 = 5;

/// Activity service
#[derive(Clone)]
pub struct ActivityService {
    db: PgPool,
    llm: LlmClient,
}

/// Logged farm activity
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FarmActivity {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub value: Option<Decimal>,
    pub unit: Option<String>,
    pub carbon_footprint_kg: Option<Decimal>,
}

impl ActivityRecord for FarmActivity {
    fn activity_type(&self) -> &str {
        &self.activity_type
    }
}

/// Input for logging an activity
#[derive(Debug, Deserialize)]
pub struct CreateActivityInput {
    pub farm_id: Uuid,
    pub activity_type: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub value: Option<Decimal>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CarbonEstimateReply {
    #[serde(default)]
    carbon_kg: Option<serde_json::Value>,
}

const ACTIVITY_COLUMNS: &str =
    "id, farm_id, user_id, activity_type, description, date, value, unit, carbon_footprint_kg";

fn carbon_prompt(input: &CreateActivityInput) -> String {
    let amount = match (&input.value, &input.unit) {
        (Some(value), Some(unit)) => format!("{} {}", value, unit),
        (Some(value), None) => value.to_string(),
        _ => "not recorded".to_string(),
    };

    format!(
        "You are a carbon footprint analyst for agriculture.\n\
         A farmer in Kenya performed:\n\
         - Activity: {}\n\
         - Details: {}\n\
         - Amount: {}\n\n\
         Consider: \"Planting\"/\"Harvesting\" with \"litres\" implies diesel. \
         \"Fertilizing\" with \"kg\" implies nitrogen fertilizer.\n\n\
         Provide a single, reasonable estimate for the carbon footprint in kilograms of CO2 \
         equivalent (kg CO2e). Return ONLY a valid JSON object containing a single key: \
         \"carbon_kg\". Example: {{\"carbon_kg\": 25.5}}",
        input.activity_type,
        input.description.as_deref().unwrap_or("No description."),
        amount
    )
}

fn estimate_from_reply(reply: &CarbonEstimateReply) -> Decimal {
    reply
        .carbon_kg
        .as_ref()
        .and_then(serde_json::Value::as_f64)
        .filter(|kg| *kg >= 0.0)
        .and_then(|kg| Decimal::try_from(kg).ok())
        .map(|kg| kg.round_dp(3))
        .unwrap_or(MALFORMED_ESTIMATE)
}

impl ActivityService {
    pub fn new(db: PgPool, llm: LlmClient) -> Self {
        Self { db, llm }
    }

    /// Ask the model for a footprint, falling back to the static table
    async fn estimate_carbon(&self, input: &CreateActivityInput) -> Decimal {
        let messages = vec![ChatMessage::user(carbon_prompt(input))];

        match self.llm.complete_json::<CarbonEstimateReply>(messages).await {
            Ok(reply) => {
                let estimate = estimate_from_reply(&reply);
                if reply.carbon_kg.as_ref().and_then(|v| v.as_f64()).map_or(true, |kg| kg < 0.0) {
                    tracing::warn!(activity_type = %input.activity_type, "Carbon estimate reply had no usable carbon_kg");
                }
                estimate
            }
            Err(e) => {
                tracing::warn!(
                    activity_type = %input.activity_type,
                    "Carbon estimation unavailable, using fallback: {}",
                    e
                );
                shared::fallback_carbon_estimate(&input.activity_type)
            }
        }
    }

    /// Log an activity on one of the user's farms
    pub async fn create_activity(&self, user_id: Uuid, input: CreateActivityInput) -> AppResult<FarmActivity> {
        shared::validate_activity_type(&input.activity_type)
            .map_err(|msg| AppError::validation("activity_type", msg))?;

        match find_owned_farm(&self.db, user_id, input.farm_id).await {
            Ok(_) => {}
            Err(AppError::Forbidden(_)) => return Err(AppError::NotFound("Farm".to_string())),
            Err(e) => return Err(e),
        }

        let carbon_footprint_kg = self.estimate_carbon(&input).await;
        let date = input.date.unwrap_or_else(Utc::now);

        let activity = sqlx::query_as::<_, FarmActivity>(&format!(
            r#"
            INSERT INTO farm_activities
                (farm_id, user_id, activity_type, description, date, value, unit, carbon_footprint_kg)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ACTIVITY_COLUMNS
        ))
        .bind(input.farm_id)
        .bind(user_id)
        .bind(input.activity_type.trim())
        .bind(&input.description)
        .bind(date)
        .bind(input.value)
        .bind(&input.unit)
        .bind(carbon_footprint_kg)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            activity_id = %activity.id,
            farm_id = %activity.farm_id,
            carbon_kg = %carbon_footprint_kg,
            "Activity logged"
        );

        Ok(activity)
    }

    /// Activities for one farm, newest first
    pub async fn list_for_farm(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<Vec<FarmActivity>> {
        find_owned_farm(&self.db, user_id, farm_id).await?;
        self.recent_for_farm(farm_id, None).await
    }

    /// Up to `limit` most recent activities of a farm, all when `None`
    pub async fn recent_for_farm(&self, farm_id: Uuid, limit: Option<i64>) -> AppResult<Vec<FarmActivity>> {
        let activities = sqlx::query_as::<_, FarmActivity>(&format!(
            "SELECT {} FROM farm_activities WHERE farm_id = $1 ORDER BY date DESC LIMIT $2",
            ACTIVITY_COLUMNS
        ))
        .bind(farm_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(activities)
    }

    /// Most recent activities across all of the user's farms
    pub async fn recent_for_user(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<FarmActivity>> {
        let limit = limit.clamp(1, shared::MAX_PAGE_LIMIT);

        let activities = sqlx::query_as::<_, FarmActivity>(
            r#"
            SELECT a.id, a.farm_id, a.user_id, a.activity_type, a.description, a.date,
                   a.value, a.unit, a.carbon_footprint_kg
            FROM farm_activities a
            JOIN farms f ON f.id = a.farm_id
            WHERE f.owner_id = $1
            ORDER BY a.date DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(activities)
    }

    pub async fn delete_activity(&self, user_id: Uuid, activity_id: Uuid) -> AppResult<()> {
        let owner_id = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM farm_activities WHERE id = $1")
            .bind(activity_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Activity".to_string()))?;

        if owner_id != user_id {
            return Err(AppError::Forbidden("Not authorized to delete this activity".to_string()));
        }

        sqlx::query("DELETE FROM farm_activities WHERE id = $1")
            .bind(activity_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Total footprint of a farm with a per-type breakdown
    pub async fn carbon_summary(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<CarbonSummary> {
        match find_owned_farm(&self.db, user_id, farm_id).await {
            Ok(_) => {}
            Err(AppError::Forbidden(_)) => return Err(AppError::NotFound("Farm".to_string())),
            Err(e) => return Err(e),
        }

        let rows = sqlx::query_as::<_, (String, Option<Decimal>)>(
            r#"
            SELECT activity_type, SUM(carbon_footprint_kg)
            FROM farm_activities
            WHERE farm_id = $1
            GROUP BY activity_type
            "#,
        )
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(CarbonSummary::from_breakdown(rows))
    }

    /// Daily footprint over the last seven days across the user's farms
    pub async fn weekly_emissions(&self, user_id: Uuid) -> AppResult<WeeklyEmissions> {
        let today = Utc::now().date_naive();
        let window_start = Utc.from_utc_datetime(&shared::emissions_window_start(today).and_time(NaiveTime::MIN));

        let entries = sqlx::query_as::<_, (DateTime<Utc>, Option<Decimal>)>(
            r#"
            SELECT a.date, a.carbon_footprint_kg
            FROM farm_activities a
            JOIN farms f ON f.id = a.farm_id
            WHERE f.owner_id = $1 AND a.date >= $2
            "#,
        )
        .bind(user_id)
        .bind(window_start)
        .fetch_all(&self.db)
        .await?;

        Ok(shared::bucket_weekly_emissions(today, entries))
    }
}
