//! Climate action advisory models and rule-based fallbacks

use serde::{Deserialize, Serialize};

use crate::assessment::{CarbonTrend, RiskAssessment, Severity, WaterStressLevel, POWDERY_MILDEW};

/// Kind of threat an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatKind {
    Pest,
    Disease,
}

/// One refined pest or disease alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestAlert {
    #[serde(rename = "type")]
    pub kind: ThreatKind,
    pub name: String,
    pub risk_level: Severity,
    pub advice: String,
}

/// Structured reply expected for pest alert refinement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PestAlertList {
    #[serde(default)]
    pub alerts: Vec<PestAlert>,
}

/// Soil carbon guidance for a farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonGuidance {
    pub estimated_current_seq_rate: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Weekly water management advice for a farm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterAdvice {
    pub next_7_days_outlook: String,
    pub irrigation_advice: String,
    #[serde(default)]
    pub tips: Vec<String>,
}

fn threat_kind(name: &str) -> ThreatKind {
    if name == POWDERY_MILDEW {
        ThreatKind::Disease
    } else {
        ThreatKind::Pest
    }
}

fn pest_advice(name: &str, severity: Severity) -> String {
    let action = match name {
        POWDERY_MILDEW => "Improve air flow between plants, avoid overhead watering and remove infected leaves early.",
        "Aphids" => "Inspect the undersides of leaves every few days and spray soapy water or neem extract on colonies.",
        "Fall Armyworm" => "Scout maize whorls for fresh feeding damage and hand-pick or treat larvae while they are small.",
        _ => "Scout the field regularly and consult your local extension officer if damage spreads.",
    };
    format!("{severity} risk this week. {action}")
}

/// Alerts built directly from the rule-based assessment
pub fn fallback_pest_alerts(assessment: &RiskAssessment) -> Vec<PestAlert> {
    assessment
        .iter()
        .map(|risk| PestAlert {
            kind: threat_kind(&risk.name),
            name: risk.name.clone(),
            risk_level: risk.severity,
            advice: pest_advice(&risk.name, risk.severity),
        })
        .collect()
}

/// Guidance built directly from the carbon trend label
pub fn fallback_carbon_guidance(trend: CarbonTrend) -> CarbonGuidance {
    let estimated_current_seq_rate = match trend {
        CarbonTrend::PotentialIncrease => "Low, recent fertilizer use may raise emissions",
        CarbonTrend::LikelyStable => "Unknown, log more activities for a better estimate",
    };

    let mut recommendations = vec![
        "Leave crop residues on the field or compost them instead of burning.".to_string(),
        "Plant a legume cover crop between seasons to build soil organic matter.".to_string(),
        "Add trees or hedgerows along field boundaries.".to_string(),
    ];
    if trend == CarbonTrend::PotentialIncrease {
        recommendations[2] =
            "Split fertilizer into smaller doses and combine it with manure to cut losses.".to_string();
    }

    CarbonGuidance {
        estimated_current_seq_rate: estimated_current_seq_rate.to_string(),
        recommendations,
    }
}

/// Advice built directly from the water stress level
pub fn fallback_water_advice(level: WaterStressLevel) -> WaterAdvice {
    let (outlook, irrigation) = match level {
        WaterStressLevel::High => (
            "Expect a large water deficit over the next 7 days.",
            "Irrigate deeply early in the morning every two to three days.",
        ),
        WaterStressLevel::Medium => (
            "Expect a moderate water deficit over the next 7 days.",
            "Irrigate once or twice this week, early morning or late evening.",
        ),
        WaterStressLevel::Low => (
            "Rainfall should roughly balance crop water use over the next 7 days.",
            "Check soil moisture by hand before irrigating.",
        ),
        WaterStressLevel::Surplus => (
            "Rainfall should exceed crop water use over the next 7 days.",
            "Hold off irrigation and clear drainage channels to avoid waterlogging.",
        ),
        WaterStressLevel::Unknown => (
            "Not enough forecast data to estimate water stress.",
            "Check soil moisture by hand before irrigating.",
        ),
    };

    let tips = match level {
        WaterStressLevel::High | WaterStressLevel::Medium => vec![
            "Mulch around plants to keep moisture in the soil.".to_string(),
            "Check pipes and hoses for leaks.".to_string(),
        ],
        _ => vec![
            "Harvest rainwater for drier weeks.".to_string(),
            "Keep weeds down so they do not compete for water.".to_string(),
        ],
    };

    WaterAdvice {
        next_7_days_outlook: outlook.to_string(),
        irrigation_advice: irrigation.to_string(),
        tips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::assess_pest_disease_risk;
    use crate::models::DailyWeatherSeries;

    #[test]
    fn test_fallback_alerts_follow_assessment() {
        let series = DailyWeatherSeries {
            relative_humidity_2m_mean: vec![Some(90.0); 4],
            temperature_2m_max: vec![Some(31.0); 4],
            ..Default::default()
        };
        let alerts = fallback_pest_alerts(&assess_pest_disease_risk(&series));

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].kind, ThreatKind::Disease);
        assert_eq!(alerts[0].risk_level, Severity::High);
        assert_eq!(alerts[1].kind, ThreatKind::Pest);
    }

    #[test]
    fn test_fallback_alerts_empty_assessment() {
        assert!(fallback_pest_alerts(&RiskAssessment::default()).is_empty());
    }

    #[test]
    fn test_pest_alert_wire_format() {
        let alert: PestAlert = serde_json::from_str(
            r#"{"type": "Pest", "name": "Aphids", "risk_level": "Low", "advice": "Scout"}"#,
        )
        .unwrap();
        assert_eq!(alert.kind, ThreatKind::Pest);
        assert_eq!(alert.risk_level, Severity::Low);
    }

    #[test]
    fn test_fallback_guidance_has_three_recommendations() {
        let guidance = fallback_carbon_guidance(CarbonTrend::PotentialIncrease);
        assert_eq!(guidance.recommendations.len(), 3);
    }

    #[test]
    fn test_fallback_water_advice_has_two_tips() {
        for level in [WaterStressLevel::High, WaterStressLevel::Surplus, WaterStressLevel::Unknown] {
            assert_eq!(fallback_water_advice(level).tips.len(), 2);
        }
    }
}
