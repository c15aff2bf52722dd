//! Soil report analysis models

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Number of recent unique crop suggestions surfaced in the summary
pub const RECENT_SUGGESTION_LIMIT: usize = 3;

/// Structured reply expected from the soil analyst model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoilAnalysis {
    #[serde(default)]
    pub ai_analysis_text: String,
    #[serde(default)]
    pub suggested_crops: Vec<String>,
}

/// Crop suggestions across all of a user's soil reports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CropSuggestionSummary {
    pub unique_suggestion_count: usize,
    pub recent_suggestions: Vec<String>,
}

/// Summarize crop suggestions from reports ordered newest first.
///
/// Suggestions are compared case-insensitively after trimming. The first
/// spelling seen is the one reported.
pub fn summarize_crop_suggestions<I, S>(reports: I) -> CropSuggestionSummary
where
    I: IntoIterator<Item = S>,
    S: AsRef<[String]>,
{
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();

    for report in reports {
        for crop in report.as_ref() {
            let crop = crop.trim();
            if crop.is_empty() {
                continue;
            }
            if seen.insert(crop.to_lowercase()) {
                ordered.push(crop.to_string());
            }
        }
    }

    CropSuggestionSummary {
        unique_suggestion_count: ordered.len(),
        recent_suggestions: ordered.into_iter().take(RECENT_SUGGESTION_LIMIT).collect(),
    }
}
