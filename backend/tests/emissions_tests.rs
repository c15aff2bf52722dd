//! Emissions and crop suggestion integration tests
//!
//! Weekly bucketing, carbon summaries, fallback estimates and soil report
//! crop suggestion summaries.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    bucket_weekly_emissions, emissions_window_start, fallback_carbon_estimate,
    summarize_crop_suggestions, CarbonSummary, WeeklyEmissions, EMISSIONS_WINDOW_DAYS,
    RECENT_SUGGESTION_LIMIT,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn days_ago(days: i64, hour: u32) -> chrono::DateTime<Utc> {
    let date = today() - Duration::days(days);
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_window_covers_seven_days() {
        assert_eq!(emissions_window_start(today()), NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
    }

    #[test]
    fn test_no_activities_gives_zeroed_week() {
        let weekly = bucket_weekly_emissions(today(), Vec::<(chrono::DateTime<Utc>, Option<Decimal>)>::new());
        assert_eq!(weekly, WeeklyEmissions::empty());
        assert_eq!(weekly.trend_percent, None);
    }

    #[test]
    fn test_window_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let feb_25 = Utc.with_ymd_and_hms(2024, 2, 25, 12, 0, 0).unwrap();
        let feb_24 = Utc.with_ymd_and_hms(2024, 2, 24, 12, 0, 0).unwrap();

        let weekly = bucket_weekly_emissions(
            today,
            vec![(feb_25, Some(Decimal::from(4))), (feb_24, Some(Decimal::from(9)))],
        );
        assert_eq!(weekly.daily_emissions[0], Decimal::from(4));
        assert_eq!(weekly.total_emissions_kg, Decimal::from(4));
    }

    #[test]
    fn test_fertilizing_dominates_summary() {
        let summary = CarbonSummary::from_breakdown(vec![
            ("Fertilizing".to_string(), Some(fallback_carbon_estimate("Fertilizing") * Decimal::from(2))),
            ("Planting".to_string(), Some(fallback_carbon_estimate("Planting"))),
        ]);
        assert_eq!(summary.total_carbon_kg, Decimal::new(215, 1));
        assert_eq!(summary.breakdown_by_activity["Fertilizing"], Decimal::from(20));
    }

    #[test]
    fn test_unknown_activity_uses_default_estimate() {
        assert_eq!(fallback_carbon_estimate("Mulching"), Decimal::new(5, 1));
        assert_eq!(fallback_carbon_estimate("planting"), Decimal::new(5, 1));
    }

    #[test]
    fn test_crop_summary_skips_blank_suggestions() {
        let reports = vec![vec![" ".to_string(), "Sorghum ".to_string()], vec!["sorghum".to_string()]];
        let summary = summarize_crop_suggestions(&reports);
        assert_eq!(summary.unique_suggestion_count, 1);
        assert_eq!(summary.recent_suggestions, vec!["Sorghum".to_string()]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn entry_strategy() -> impl Strategy<Value = (i64, u32, Option<Decimal>)> {
        (
            -3i64..14,
            0u32..24,
            prop::option::of((0i64..100_000).prop_map(|n| Decimal::new(n, 3))),
        )
    }

    fn crop_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["Maize", "maize", "Beans", "Sorghum", "Cassava", "Kale", "Tea"])
            .prop_map(str::to_string)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The week always has one bucket per day and the total matches them
        #[test]
        fn prop_weekly_total_matches_buckets(entries in prop::collection::vec(entry_strategy(), 0..30)) {
            let weekly = bucket_weekly_emissions(
                today(),
                entries.iter().map(|(ago, hour, kg)| (days_ago(*ago, *hour), *kg)),
            );

            prop_assert_eq!(weekly.daily_emissions.len(), EMISSIONS_WINDOW_DAYS);
            let bucket_sum: Decimal = weekly.daily_emissions.iter().copied().sum();
            prop_assert_eq!(weekly.total_emissions_kg, bucket_sum.round_dp(2));
        }

        /// Activities outside the window never contribute
        #[test]
        fn prop_out_of_window_entries_ignored(entries in prop::collection::vec(entry_strategy(), 0..30)) {
            let in_window: Decimal = entries
                .iter()
                .filter(|(ago, _, _)| (0..EMISSIONS_WINDOW_DAYS as i64).contains(ago))
                .map(|(_, _, kg)| kg.unwrap_or_default())
                .sum();

            let weekly = bucket_weekly_emissions(
                today(),
                entries.iter().map(|(ago, hour, kg)| (days_ago(*ago, *hour), *kg)),
            );
            prop_assert_eq!(weekly.total_emissions_kg, in_window.round_dp(2));
        }

        /// Crop summaries count unique crops and cap the recent list
        #[test]
        fn prop_crop_summary_bounds(
            reports in prop::collection::vec(prop::collection::vec(crop_strategy(), 0..5), 0..6)
        ) {
            let summary = summarize_crop_suggestions(&reports);
            let total: usize = reports.iter().map(Vec::len).sum();

            prop_assert!(summary.unique_suggestion_count <= total);
            prop_assert!(summary.recent_suggestions.len() <= RECENT_SUGGESTION_LIMIT);
            prop_assert_eq!(
                summary.recent_suggestions.len(),
                summary.unique_suggestion_count.min(RECENT_SUGGESTION_LIMIT)
            );
        }
    }
}
