//! Rule-based agronomic risk assessment
//!
//! Turns a short daily weather series (and, for carbon, a window of recent
//! farm activities) into qualitative labels. Every function here is pure and
//! total: sparse or misaligned input maps to a documented default.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::DailyWeatherSeries;

// ============================================================================
// Rule thresholds
// ============================================================================

/// Relative humidity (%) above which a day counts as a high-humidity day
pub const HIGH_HUMIDITY_THRESHOLD: f64 = 85.0;
/// Average humidity assumed when the series carries no humidity values
pub const DEFAULT_AVERAGE_HUMIDITY: f64 = 60.0;
pub const MILDEW_HIGH_MIN_HUMID_DAYS: usize = 3;
pub const MILDEW_HIGH_AVERAGE_HUMIDITY: f64 = 75.0;
pub const MILDEW_MEDIUM_AVERAGE_HUMIDITY: f64 = 70.0;

/// Max temperature (°C) above which a day counts as warm
pub const WARM_DAY_THRESHOLD: f64 = 28.0;
/// Total precipitation (mm) below which the period counts as dry
pub const DRY_PERIOD_PRECIPITATION_MM: f64 = 10.0;
pub const INSECT_OUTBREAK_MIN_WARM_DAYS: usize = 3;

/// Maximum number of risks reported by a pest assessment
pub const MAX_REPORTED_RISKS: usize = 2;

/// Net water balance (mm) thresholds, checked in order
pub const WATER_HIGH_STRESS_BELOW: f64 = -20.0;
pub const WATER_MEDIUM_STRESS_BELOW: f64 = -5.0;
pub const WATER_LOW_STRESS_BELOW: f64 = 5.0;

/// Number of most recent activities the carbon heuristic looks at
pub const CARBON_TREND_WINDOW: usize = 5;

pub const POWDERY_MILDEW: &str = "Powdery Mildew";
pub const APHIDS: &str = "Aphids";
pub const FALL_ARMYWORM: &str = "Fall Armyworm";

// ============================================================================
// Pest and disease risk
// ============================================================================

/// Severity of a single pest or disease risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Ranking weight used to order risks
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PestRisk {
    pub name: String,
    pub severity: Severity,
}

/// Ordered risk-name to severity mapping, highest severity first.
///
/// Serializes as a JSON object in rank order, e.g.
/// `{"Powdery Mildew": "High", "Aphids": "Medium"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskAssessment {
    risks: Vec<PestRisk>,
}

impl RiskAssessment {
    pub fn get(&self, name: &str) -> Option<Severity> {
        self.risks
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.severity)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.risks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PestRisk> {
        self.risks.iter()
    }

    /// Ranks candidates by severity weight, ties keeping insertion order,
    /// and keeps the top `MAX_REPORTED_RISKS`.
    fn ranked(mut candidates: Vec<PestRisk>) -> Self {
        // sort_by is stable
        candidates.sort_by(|a, b| b.severity.weight().cmp(&a.severity.weight()));
        candidates.truncate(MAX_REPORTED_RISKS);
        Self { risks: candidates }
    }
}

impl Serialize for RiskAssessment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.risks.len()))?;
        for risk in &self.risks {
            map.serialize_entry(&risk.name, &risk.severity)?;
        }
        map.end()
    }
}

/// Assess pest and disease risk from humidity, max temperature and
/// precipitation. Null readings are skipped.
pub fn assess_pest_disease_risk(series: &DailyWeatherSeries) -> RiskAssessment {
    let humidity: Vec<f64> = series.relative_humidity_2m_mean.iter().flatten().copied().collect();
    let avg_humidity = if humidity.is_empty() {
        DEFAULT_AVERAGE_HUMIDITY
    } else {
        humidity.iter().sum::<f64>() / humidity.len() as f64
    };
    let high_humidity_days = humidity
        .iter()
        .filter(|h| **h > HIGH_HUMIDITY_THRESHOLD)
        .count();

    let mut candidates = Vec::new();

    if high_humidity_days >= MILDEW_HIGH_MIN_HUMID_DAYS && avg_humidity > MILDEW_HIGH_AVERAGE_HUMIDITY {
        candidates.push(risk(POWDERY_MILDEW, Severity::High));
    } else if high_humidity_days >= 1 || avg_humidity > MILDEW_MEDIUM_AVERAGE_HUMIDITY {
        candidates.push(risk(POWDERY_MILDEW, Severity::Medium));
    }

    let warm_days = series
        .temperature_2m_max
        .iter()
        .flatten()
        .filter(|t| **t > WARM_DAY_THRESHOLD)
        .count();
    let total_precip: f64 = series.precipitation_sum.iter().flatten().sum();
    let dry_period = total_precip < DRY_PERIOD_PRECIPITATION_MM;

    if warm_days >= INSECT_OUTBREAK_MIN_WARM_DAYS && dry_period {
        candidates.push(risk(APHIDS, Severity::Medium));
        candidates.push(risk(FALL_ARMYWORM, Severity::Medium));
    } else if warm_days >= 1 && dry_period {
        candidates.push(risk(APHIDS, Severity::Low));
    }

    RiskAssessment::ranked(candidates)
}

fn risk(name: &str, severity: Severity) -> PestRisk {
    PestRisk {
        name: name.to_string(),
        severity,
    }
}

// ============================================================================
// Water stress
// ============================================================================

/// Water stress classification for the forecast window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterStressLevel {
    Unknown,
    Low,
    Medium,
    High,
    #[serde(rename = "Very Low / Surplus")]
    Surplus,
}

impl WaterStressLevel {
    /// Position in the stress order, `None` for `Unknown`
    pub fn stress_rank(&self) -> Option<u8> {
        match self {
            WaterStressLevel::Unknown => None,
            WaterStressLevel::Surplus => Some(0),
            WaterStressLevel::Low => Some(1),
            WaterStressLevel::Medium => Some(2),
            WaterStressLevel::High => Some(3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaterStressLevel::Unknown => "Unknown",
            WaterStressLevel::Low => "Low",
            WaterStressLevel::Medium => "Medium",
            WaterStressLevel::High => "High",
            WaterStressLevel::Surplus => "Very Low / Surplus",
        }
    }

    /// Classify a net water balance (precipitation minus evapotranspiration)
    pub fn from_net_water(net_water: f64) -> Self {
        if net_water < WATER_HIGH_STRESS_BELOW {
            WaterStressLevel::High
        } else if net_water < WATER_MEDIUM_STRESS_BELOW {
            WaterStressLevel::Medium
        } else if net_water < WATER_LOW_STRESS_BELOW {
            WaterStressLevel::Low
        } else {
            WaterStressLevel::Surplus
        }
    }
}

impl std::fmt::Display for WaterStressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Net water balance over aligned days, or `None` when the precipitation
/// and evapotranspiration series cannot be paired up.
pub fn net_water_balance(series: &DailyWeatherSeries) -> Option<f64> {
    let precip = &series.precipitation_sum;
    let et0 = &series.et0_fao_evapotranspiration;

    if precip.is_empty() || et0.is_empty() || precip.len() != et0.len() {
        return None;
    }

    precip
        .iter()
        .zip(et0)
        .map(|(p, e)| Some((*p)? - (*e)?))
        .sum()
}

/// Assess water stress from precipitation and reference evapotranspiration.
/// Empty, misaligned or null-bearing series yield `Unknown`.
pub fn assess_water_stress(series: &DailyWeatherSeries) -> WaterStressLevel {
    match net_water_balance(series) {
        Some(net_water) => WaterStressLevel::from_net_water(net_water),
        None => WaterStressLevel::Unknown,
    }
}

// ============================================================================
// Carbon trend
// ============================================================================

/// Anything that carries a farm activity type
pub trait ActivityRecord {
    fn activity_type(&self) -> &str;
}

impl ActivityRecord for str {
    fn activity_type(&self) -> &str {
        self
    }
}

impl ActivityRecord for String {
    fn activity_type(&self) -> &str {
        self.as_str()
    }
}

impl<T: ActivityRecord + ?Sized> ActivityRecord for &T {
    fn activity_type(&self) -> &str {
        (**self).activity_type()
    }
}

/// Coarse carbon trend label for a farm's recent activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarbonTrend {
    #[serde(rename = "Potential Increase (Fertilizing)")]
    PotentialIncrease,
    #[serde(rename = "Likely Stable / Unknown")]
    LikelyStable,
}

impl CarbonTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarbonTrend::PotentialIncrease => "Potential Increase (Fertilizing)",
            CarbonTrend::LikelyStable => "Likely Stable / Unknown",
        }
    }
}

impl std::fmt::Display for CarbonTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assess the carbon trend from activities ordered most recent first.
/// Only the first `CARBON_TREND_WINDOW` records are considered.
pub fn assess_carbon_trend<A: ActivityRecord>(activities: &[A]) -> CarbonTrend {
    let fertilizing = activities
        .iter()
        .take(CARBON_TREND_WINDOW)
        .any(|a| a.activity_type() == "Fertilizing");

    if fertilizing {
        CarbonTrend::PotentialIncrease
    } else {
        CarbonTrend::LikelyStable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> DailyWeatherSeries {
        DailyWeatherSeries::default()
    }

    fn values(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_empty_series_has_no_pest_risk() {
        let assessment = assess_pest_disease_risk(&series());
        assert!(assessment.is_empty());
    }

    #[test]
    fn test_warm_dry_week_flags_aphids_and_armyworm() {
        let mut s = series();
        s.temperature_2m_max = values(&[30.0, 31.0, 29.0, 32.0, 33.0]);
        s.precipitation_sum = values(&[1.0, 0.0, 0.0, 2.0, 0.0]);

        let assessment = assess_pest_disease_risk(&s);
        assert_eq!(assessment.get(APHIDS), Some(Severity::Medium));
        assert_eq!(assessment.get(FALL_ARMYWORM), Some(Severity::Medium));
        assert_eq!(assessment.len(), 2);
    }

    #[test]
    fn test_single_warm_day_flags_aphids_low() {
        let mut s = series();
        s.temperature_2m_max = values(&[29.0, 20.0, 21.0]);
        s.precipitation_sum = values(&[0.0, 0.0, 0.0]);

        let assessment = assess_pest_disease_risk(&s);
        assert_eq!(assessment.get(APHIDS), Some(Severity::Low));
        assert!(!assessment.contains(FALL_ARMYWORM));
    }

    #[test]
    fn test_wet_period_suppresses_insects() {
        let mut s = series();
        s.temperature_2m_max = values(&[30.0, 31.0, 32.0]);
        s.precipitation_sum = values(&[4.0, 4.0, 2.0]);

        assert!(assess_pest_disease_risk(&s).is_empty());
    }

    #[test]
    fn test_mildew_high_ranks_before_insects() {
        let mut s = series();
        s.relative_humidity_2m_mean = values(&[90.0, 88.0, 86.0, 80.0]);
        s.temperature_2m_max = values(&[30.0, 31.0, 32.0, 33.0]);

        let assessment = assess_pest_disease_risk(&s);
        let names: Vec<&str> = assessment.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![POWDERY_MILDEW, APHIDS]);
        assert_eq!(assessment.get(POWDERY_MILDEW), Some(Severity::High));
    }

    #[test]
    fn test_low_ranks_after_medium_mildew() {
        let mut s = series();
        s.relative_humidity_2m_mean = values(&[72.0, 72.0]);
        s.temperature_2m_max = values(&[29.0, 20.0]);

        let assessment = assess_pest_disease_risk(&s);
        let ranked: Vec<Severity> = assessment.iter().map(|r| r.severity).collect();
        assert_eq!(ranked, vec![Severity::Medium, Severity::Low]);
    }

    #[test]
    fn test_null_humidity_values_are_skipped() {
        let mut s = series();
        s.relative_humidity_2m_mean = vec![None, Some(50.0), None];

        assert!(!assess_pest_disease_risk(&s).contains(POWDERY_MILDEW));
    }

    #[test]
    fn test_risk_assessment_serializes_in_rank_order() {
        let mut s = series();
        s.relative_humidity_2m_mean = values(&[90.0, 90.0, 90.0]);
        s.temperature_2m_max = values(&[30.0, 30.0, 30.0]);

        let json = serde_json::to_string(&assess_pest_disease_risk(&s)).unwrap();
        assert_eq!(json, r#"{"Powdery Mildew":"High","Aphids":"Medium"}"#);
    }

    #[test]
    fn test_water_stress_high_on_heavy_deficit() {
        let mut s = series();
        s.precipitation_sum = values(&[0.0, 0.0, 0.0]);
        s.et0_fao_evapotranspiration = values(&[10.0, 10.0, 10.0]);

        assert_eq!(assess_water_stress(&s), WaterStressLevel::High);
    }

    #[test]
    fn test_water_stress_thresholds() {
        assert_eq!(WaterStressLevel::from_net_water(-20.0), WaterStressLevel::Medium);
        assert_eq!(WaterStressLevel::from_net_water(-5.0), WaterStressLevel::Low);
        assert_eq!(WaterStressLevel::from_net_water(4.9), WaterStressLevel::Low);
        assert_eq!(WaterStressLevel::from_net_water(5.0), WaterStressLevel::Surplus);
    }

    #[test]
    fn test_water_stress_unknown_on_missing_or_misaligned() {
        let mut s = series();
        assert_eq!(assess_water_stress(&s), WaterStressLevel::Unknown);

        s.precipitation_sum = values(&[1.0, 2.0]);
        assert_eq!(assess_water_stress(&s), WaterStressLevel::Unknown);

        s.et0_fao_evapotranspiration = values(&[1.0]);
        assert_eq!(assess_water_stress(&s), WaterStressLevel::Unknown);

        s.et0_fao_evapotranspiration = vec![Some(1.0), None];
        assert_eq!(assess_water_stress(&s), WaterStressLevel::Unknown);
    }

    #[test]
    fn test_surplus_label() {
        assert_eq!(WaterStressLevel::Surplus.to_string(), "Very Low / Surplus");
        let json = serde_json::to_string(&WaterStressLevel::Surplus).unwrap();
        assert_eq!(json, r#""Very Low / Surplus""#);
    }

    #[test]
    fn test_carbon_trend_fertilizing_in_window() {
        let activities = ["Planting", "Fertilizing", "Harvesting"];
        assert_eq!(assess_carbon_trend(&activities), CarbonTrend::PotentialIncrease);
    }

    #[test]
    fn test_carbon_trend_ignores_beyond_window() {
        let activities = ["Planting", "Weeding", "Harvesting", "Planting", "Irrigation", "Fertilizing"];
        assert_eq!(assess_carbon_trend(&activities), CarbonTrend::LikelyStable);
    }

    #[test]
    fn test_carbon_trend_empty() {
        let activities: [&str; 0] = [];
        assert_eq!(assess_carbon_trend(&activities), CarbonTrend::LikelyStable);
        assert_eq!(CarbonTrend::LikelyStable.to_string(), "Likely Stable / Unknown");
    }
}
