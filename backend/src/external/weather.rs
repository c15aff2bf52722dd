//! Weather API client for fetching daily forecasts
//!
//! Integrates with the Open-Meteo forecast API. Requests are retried with
//! exponential backoff; a status failure on the last attempt is reported as a
//! bad gateway and a connection failure as service unavailable.

use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    base_delay_ms: u64,
    forecast_days: u32,
}

/// Why a single attempt failed
#[derive(Debug)]
enum AttemptError {
    Status(reqwest::StatusCode, String),
    Connection(reqwest::Error),
}

impl AttemptError {
    fn into_app_error(self) -> AppError {
        match self {
            AttemptError::Status(status, _) => {
                AppError::WeatherServiceError(format!("upstream returned {}", status))
            }
            AttemptError::Connection(_) => AppError::WeatherServiceUnavailable,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Status(status, body) => write!(f, "status {}: {}", status, body),
            AttemptError::Connection(e) => write!(f, "connection error: {}", e),
        }
    }
}

/// Delay before retry number `attempt + 1`: `base_delay_ms * 2^attempt`
pub fn backoff_delay(base_delay_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_delay_ms.saturating_mul(factor))
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(config: &WeatherConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.api_endpoint.clone(),
            max_retries: config.max_retries,
            base_delay_ms: config.base_delay_ms,
            forecast_days: config.forecast_days,
        }
    }

    /// Create a new WeatherClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            max_retries: 0,
            base_delay_ms: 0,
            forecast_days: 7,
        }
    }

    /// Fetch the full daily forecast document for a location.
    ///
    /// `daily_params` are Open-Meteo daily variable names.
    pub async fn get_daily_forecast(
        &self,
        latitude: Decimal,
        longitude: Decimal,
        daily_params: &[&str],
    ) -> AppResult<serde_json::Value> {
        let daily = daily_params.join(",");
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", daily),
            ("timezone", "auto".to_string()),
            ("forecast_days", self.forecast_days.to_string()),
        ];

        let mut attempt = 0;
        let response = loop {
            match self.send_once(&query).await {
                Ok(response) => break response,
                Err(err) if attempt < self.max_retries => {
                    let delay = backoff_delay(self.base_delay_ms, attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Weather fetch failed, retrying: {}",
                        err
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        attempts = attempt + 1,
                        "Weather fetch failed after retries: {}",
                        err
                    );
                    return Err(err.into_app_error());
                }
            }
        };

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::WeatherServiceError(format!("invalid forecast body: {}", e)))
    }

    async fn send_once(
        &self,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, AttemptError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .map_err(AttemptError::Connection)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status(status, body));
        }

        Ok(response)
    }
}
