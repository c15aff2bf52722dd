//! Risk assessment integration tests
//!
//! Pest and disease, water stress and carbon trend rules evaluated against
//! forecast documents shaped like the weather provider's replies.

use proptest::prelude::*;
use serde_json::json;
use shared::{
    assess_carbon_trend, assess_pest_disease_risk, assess_water_stress, fallback_pest_alerts,
    CarbonTrend, DailyWeatherSeries, Severity, ThreatKind, WaterStressLevel, APHIDS,
    CARBON_TREND_WINDOW, FALL_ARMYWORM, MAX_REPORTED_RISKS, POWDERY_MILDEW,
};

fn values(v: &[f64]) -> Vec<Option<f64>> {
    v.iter().copied().map(Some).collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_humid_week_from_forecast_document() {
        let forecast = json!({
            "latitude": -0.42,
            "longitude": 36.95,
            "daily": {
                "time": ["2024-04-01", "2024-04-02", "2024-04-03", "2024-04-04", "2024-04-05"],
                "relative_humidity_2m_mean": [88, 90, 86, 70, 72],
                "temperature_2m_max": [22.5, 23.0, 21.0, 24.0, 22.0],
                "precipitation_sum": [12.0, 8.5, 4.0, 0.0, 1.2],
                "et0_fao_evapotranspiration": [2.1, 2.4, 2.2, 3.0, 2.9]
            }
        });

        let series = DailyWeatherSeries::from_forecast(&forecast);
        let assessment = assess_pest_disease_risk(&series);

        assert_eq!(assessment.get(POWDERY_MILDEW), Some(Severity::High));
        assert!(!assessment.contains(APHIDS));
        assert_eq!(assess_water_stress(&series), WaterStressLevel::Surplus);
    }

    #[test]
    fn test_hot_dry_week_flags_insects_and_deficit() {
        let forecast = json!({
            "daily": {
                "relative_humidity_2m_mean": [40, 42, 38, 45, 41, 39, 44],
                "temperature_2m_max": [31, 32, 30, 33, 29, 30, 31],
                "precipitation_sum": [0, 0, 1.5, 0, 0, 0, 2],
                "et0_fao_evapotranspiration": [5, 5.5, 6, 5, 5.2, 5.8, 6.1]
            }
        });

        let series = DailyWeatherSeries::from_forecast(&forecast);
        let assessment = assess_pest_disease_risk(&series);

        assert_eq!(assessment.get(APHIDS), Some(Severity::Medium));
        assert_eq!(assessment.get(FALL_ARMYWORM), Some(Severity::Medium));
        assert!(!assessment.contains(POWDERY_MILDEW));
        assert_eq!(assess_water_stress(&series), WaterStressLevel::High);
    }

    #[test]
    fn test_mild_humidity_gives_medium_mildew() {
        let mut series = DailyWeatherSeries::default();
        series.relative_humidity_2m_mean = values(&[86.0, 60.0, 60.0]);

        let assessment = assess_pest_disease_risk(&series);
        assert_eq!(assessment.get(POWDERY_MILDEW), Some(Severity::Medium));
        assert_eq!(assessment.len(), 1);
    }

    #[test]
    fn test_fallback_alerts_follow_assessment() {
        let mut series = DailyWeatherSeries::default();
        series.relative_humidity_2m_mean = values(&[90.0, 90.0, 90.0]);
        series.temperature_2m_max = values(&[30.0, 30.0, 30.0]);

        let alerts = fallback_pest_alerts(&assess_pest_disease_risk(&series));
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].name, POWDERY_MILDEW);
        assert_eq!(alerts[0].kind, ThreatKind::Disease);
        assert_eq!(alerts[1].kind, ThreatKind::Pest);
        assert!(alerts[0].advice.starts_with("High"));
    }

    #[test]
    fn test_balanced_week_is_low_stress() {
        let mut series = DailyWeatherSeries::default();
        series.precipitation_sum = values(&[3.0, 2.0, 4.0]);
        series.et0_fao_evapotranspiration = values(&[3.0, 3.0, 3.0]);

        assert_eq!(assess_water_stress(&series), WaterStressLevel::Low);
    }

    #[test]
    fn test_null_reading_makes_water_stress_unknown() {
        let forecast = json!({
            "daily": {
                "precipitation_sum": [1.0, null, 2.0],
                "et0_fao_evapotranspiration": [3.0, 3.0, 3.0]
            }
        });

        let series = DailyWeatherSeries::from_forecast(&forecast);
        assert_eq!(assess_water_stress(&series), WaterStressLevel::Unknown);
    }

    #[test]
    fn test_five_warm_dry_days_flag_both_insects() {
        let forecast = json!({
            "daily": {
                "temperature_2m_max": [30, 31, 29, 32, 33],
                "precipitation_sum": [1, 0, 0, 2, 0]
            }
        });

        let assessment = assess_pest_disease_risk(&DailyWeatherSeries::from_forecast(&forecast));
        assert_eq!(
            serde_json::to_value(&assessment).unwrap(),
            json!({"Aphids": "Medium", "Fall Armyworm": "Medium"})
        );
    }

    #[test]
    fn test_thirty_mm_deficit_is_high_stress() {
        let mut series = DailyWeatherSeries::default();
        series.precipitation_sum = values(&[0.0, 0.0, 0.0]);
        series.et0_fao_evapotranspiration = values(&[10.0, 10.0, 10.0]);

        assert_eq!(assess_water_stress(&series), WaterStressLevel::High);
    }

    #[test]
    fn test_malformed_unused_fields_keep_assessments() {
        for bad_field in [
            json!({"temperature_2m_min": ["n/a", 12]}),
            json!({"time": ["2024-05-01", null, "2024-05-03"]}),
        ] {
            let mut daily = json!({
                "temperature_2m_max": [30, 31, 32],
                "precipitation_sum": [0, 0, 0],
                "et0_fao_evapotranspiration": [10, 10, 10]
            });
            for (key, value) in bad_field.as_object().unwrap() {
                daily[key] = value.clone();
            }

            let series = DailyWeatherSeries::from_forecast(&json!({ "daily": daily }));
            assert_eq!(assess_water_stress(&series), WaterStressLevel::High);

            let assessment = assess_pest_disease_risk(&series);
            assert_eq!(assessment.get(APHIDS), Some(Severity::Medium));
            assert_eq!(assessment.get(FALL_ARMYWORM), Some(Severity::Medium));
        }
    }

    #[test]
    fn test_empty_series_combinations_are_unknown() {
        let mut series = DailyWeatherSeries::default();
        assert_eq!(assess_water_stress(&series), WaterStressLevel::Unknown);

        series.precipitation_sum = values(&[2.0]);
        assert_eq!(assess_water_stress(&series), WaterStressLevel::Unknown);

        series.precipitation_sum.clear();
        series.et0_fao_evapotranspiration = values(&[2.0]);
        assert_eq!(assess_water_stress(&series), WaterStressLevel::Unknown);
    }

    #[test]
    fn test_carbon_trend_recent_fertilizing() {
        let recent = ["Weeding", "Fertilizing", "Planting"];
        assert_eq!(assess_carbon_trend(&recent), CarbonTrend::PotentialIncrease);
        assert_eq!(
            serde_json::to_value(CarbonTrend::PotentialIncrease).unwrap(),
            json!("Potential Increase (Fertilizing)")
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn reading_strategy(min: f64, max: f64) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(min..=max, 0..10)
    }

    fn activity_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["Planting", "Weeding", "Harvesting", "Irrigation", "Fertilizing"])
            .prop_map(str::to_string)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Dry air never produces a mildew risk
        #[test]
        fn prop_no_mildew_when_humidity_at_most_70(
            humidity in reading_strategy(0.0, 70.0),
            temps in reading_strategy(10.0, 40.0),
        ) {
            let mut series = DailyWeatherSeries::default();
            series.relative_humidity_2m_mean = values(&humidity);
            series.temperature_2m_max = values(&temps);

            prop_assert!(!assess_pest_disease_risk(&series).contains(POWDERY_MILDEW));
        }

        /// Three very humid days with a humid average always rank mildew High
        #[test]
        fn prop_mildew_high_on_sustained_humidity(
            humid in prop::collection::vec(85.5f64..=100.0, 3..7),
            other in prop::collection::vec(0.0f64..=100.0, 0..4),
            temps in reading_strategy(10.0, 40.0),
            precip in reading_strategy(0.0, 5.0),
        ) {
            let mut humidity = humid;
            humidity.extend(other);
            let avg = humidity.iter().sum::<f64>() / humidity.len() as f64;
            prop_assume!(avg > 75.0);

            let mut series = DailyWeatherSeries::default();
            series.relative_humidity_2m_mean = values(&humidity);
            series.temperature_2m_max = values(&temps);
            series.precipitation_sum = values(&precip);

            let assessment = assess_pest_disease_risk(&series);
            prop_assert_eq!(assessment.get(POWDERY_MILDEW), Some(Severity::High));
            prop_assert_eq!(assessment.iter().next().map(|r| r.name.as_str()), Some(POWDERY_MILDEW));
        }

        /// Reported risks are capped and ranked by severity
        #[test]
        fn prop_at_most_two_ranked_risks(
            humidity in reading_strategy(0.0, 100.0),
            temps in reading_strategy(10.0, 40.0),
            precip in reading_strategy(0.0, 8.0),
        ) {
            let mut series = DailyWeatherSeries::default();
            series.relative_humidity_2m_mean = values(&humidity);
            series.temperature_2m_max = values(&temps);
            series.precipitation_sum = values(&precip);

            let assessment = assess_pest_disease_risk(&series);
            prop_assert!(assessment.len() <= MAX_REPORTED_RISKS);

            let weights: Vec<u8> = assessment.iter().map(|r| r.severity.weight()).collect();
            prop_assert!(weights.windows(2).all(|w| w[0] >= w[1]));
        }

        /// Series of different lengths cannot be balanced
        #[test]
        fn prop_water_stress_unknown_on_length_mismatch(
            precip in prop::collection::vec(0.0f64..=30.0, 1..10),
            et0 in prop::collection::vec(0.0f64..=10.0, 1..10),
        ) {
            prop_assume!(precip.len() != et0.len());

            let mut series = DailyWeatherSeries::default();
            series.precipitation_sum = values(&precip);
            series.et0_fao_evapotranspiration = values(&et0);

            prop_assert_eq!(assess_water_stress(&series), WaterStressLevel::Unknown);
        }

        /// Less net water never means less stress
        #[test]
        fn prop_stress_rank_monotonic(a in -60.0f64..60.0, b in -60.0f64..60.0) {
            let (drier, wetter) = if a <= b { (a, b) } else { (b, a) };
            let drier_rank = WaterStressLevel::from_net_water(drier).stress_rank();
            let wetter_rank = WaterStressLevel::from_net_water(wetter).stress_rank();

            prop_assert!(drier_rank.is_some() && wetter_rank.is_some());
            prop_assert!(drier_rank >= wetter_rank);
        }

        /// Only the most recent activities influence the carbon trend
        #[test]
        fn prop_carbon_trend_ignores_older_activities(
            recent in prop::collection::vec(activity_strategy(), CARBON_TREND_WINDOW),
            older in prop::collection::vec(activity_strategy(), 0..10),
        ) {
            let mut all = recent.clone();
            all.extend(older);

            prop_assert_eq!(assess_carbon_trend(all.as_slice()), assess_carbon_trend(recent.as_slice()));

            let expected = if recent.iter().any(|a| a == "Fertilizing") {
                CarbonTrend::PotentialIncrease
            } else {
                CarbonTrend::LikelyStable
            };
            prop_assert_eq!(assess_carbon_trend(all.as_slice()), expected);
        }
    }
}
