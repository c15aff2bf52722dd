//! Farm activity carbon accounting

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days covered by the weekly emissions summary, today inclusive
pub const EMISSIONS_WINDOW_DAYS: usize = 7;

/// Static carbon estimate (kg CO2e) used when the estimator is unavailable
pub fn fallback_carbon_estimate(activity_type: &str) -> Decimal {
    match activity_type {
        "Planting" => Decimal::new(15, 1),
        "Harvesting" => Decimal::new(18, 1),
        "Fertilizing" => Decimal::new(100, 1),
        _ => Decimal::new(5, 1),
    }
}

/// Total and per-activity-type carbon for one farm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarbonSummary {
    pub total_carbon_kg: Decimal,
    pub breakdown_by_activity: BTreeMap<String, Decimal>,
}

impl CarbonSummary {
    /// Build from per-type sums. Types with no recorded footprint are left out.
    pub fn from_breakdown<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<Decimal>)>,
    {
        let breakdown_by_activity: BTreeMap<String, Decimal> = rows
            .into_iter()
            .filter_map(|(activity_type, carbon)| carbon.map(|c| (activity_type, c)))
            .collect();
        let total_carbon_kg = breakdown_by_activity.values().copied().sum();

        Self {
            total_carbon_kg,
            breakdown_by_activity,
        }
    }
}

/// Emissions over the last seven days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEmissions {
    pub total_emissions_kg: Decimal,
    /// One bucket per day, oldest to newest
    pub daily_emissions: Vec<Decimal>,
    pub trend_percent: Option<Decimal>,
}

impl WeeklyEmissions {
    pub fn empty() -> Self {
        Self {
            total_emissions_kg: Decimal::ZERO,
            daily_emissions: vec![Decimal::ZERO; EMISSIONS_WINDOW_DAYS],
            trend_percent: None,
        }
    }
}

/// First day of the weekly window ending on `today`
pub fn emissions_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(EMISSIONS_WINDOW_DAYS as i64 - 1)
}

/// Bucket activity footprints by UTC day over the window ending on `today`.
/// Entries outside the window are ignored and missing footprints count as zero.
pub fn bucket_weekly_emissions<I>(today: NaiveDate, entries: I) -> WeeklyEmissions
where
    I: IntoIterator<Item = (DateTime<Utc>, Option<Decimal>)>,
{
    let start = emissions_window_start(today);
    let mut weekly = WeeklyEmissions::empty();
    let mut total = Decimal::ZERO;

    for (date, footprint) in entries {
        let offset = (date.date_naive() - start).num_days();
        if !(0..EMISSIONS_WINDOW_DAYS as i64).contains(&offset) {
            continue;
        }
        let footprint = footprint.unwrap_or_default();
        weekly.daily_emissions[offset as usize] += footprint;
        total += footprint;
    }

    weekly.total_emissions_kg = total.round_dp(2);
    weekly
}
