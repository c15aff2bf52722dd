//! Weather forecast models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Daily parameters requested from the forecast provider
pub const DAILY_FORECAST_PARAMS: &[&str] = &[
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "relative_humidity_2m_mean",
    "et0_fao_evapotranspiration",
];

/// Per-field daily series as returned under the provider's `daily` key.
///
/// Any field may be absent and any element may be null. Field lengths are
/// not guaranteed to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyWeatherSeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m_mean: Vec<Option<f64>>,
    #[serde(default)]
    pub et0_fao_evapotranspiration: Vec<Option<f64>>,
}

impl DailyWeatherSeries {
    /// Extract the daily block from a full forecast document.
    ///
    /// Each field is read on its own. A field that is not an array is
    /// treated as absent and a non-numeric reading becomes null, so one bad
    /// value never costs the other series.
    pub fn from_forecast(forecast: &Value) -> Self {
        let Some(daily) = forecast.get("daily") else {
            return Self::default();
        };

        Self {
            time: field(daily, "time")
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect(),
            temperature_2m_max: readings(daily, "temperature_2m_max"),
            temperature_2m_min: readings(daily, "temperature_2m_min"),
            precipitation_sum: readings(daily, "precipitation_sum"),
            relative_humidity_2m_mean: readings(daily, "relative_humidity_2m_mean"),
            et0_fao_evapotranspiration: readings(daily, "et0_fao_evapotranspiration"),
        }
    }
}

fn field<'a>(daily: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    daily
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn readings(daily: &Value, key: &str) -> Vec<Option<f64>> {
    field(daily, key).map(Value::as_f64).collect()
}
