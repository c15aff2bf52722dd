//! Weather forecast for a farm

use serde::Serialize;
use shared::DAILY_FORECAST_PARAMS;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;
use crate::services::farm::{find_owned_farm, Farm};

/// Climate service
#[derive(Clone)]
pub struct ClimateService {
    db: PgPool,
    weather: WeatherClient,
}

/// Raw forecast with crop recommendations
#[derive(Debug, Serialize)]
pub struct FarmForecast {
    pub forecast: serde_json::Value,
    pub recommendations: Vec<String>,
}

/// Forecast for a farm's stored coordinates
pub(crate) async fn fetch_farm_forecast(
    weather: &WeatherClient,
    farm: &Farm,
    daily_params: &[&str],
) -> AppResult<serde_json::Value> {
    let coords = farm
        .coordinates()
        .ok_or_else(|| AppError::BadRequest("Farm has no coordinates".to_string()))?;

    weather
        .get_daily_forecast(coords.latitude, coords.longitude, daily_params)
        .await
}

impl ClimateService {
    pub fn new(db: PgPool, weather: WeatherClient) -> Self {
        Self { db, weather }
    }

    pub async fn forecast(&self, user_id: Uuid, farm_id: Uuid) -> AppResult<FarmForecast> {
        let farm = find_owned_farm(&self.db, user_id, farm_id).await?;

        let mut params = vec!["weathercode"];
        params.extend_from_slice(DAILY_FORECAST_PARAMS);

        let forecast = fetch_farm_forecast(&self.weather, &farm, &params).await?;

        Ok(FarmForecast {
            forecast,
            recommendations: Vec::new(),
        })
    }
}
