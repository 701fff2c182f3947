// What-if simulation
// Replays historical execution events under alternate constraints and projects metrics

pub mod synthetic;
pub mod what_if;
pub mod comparison;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::StrategyMetrics;
use crate::error::{AnalyticsError, AnalyticsResult};

pub use comparison::compare_scenarios;
pub use synthetic::{SeededFillGenerator, SyntheticFillConfig, SyntheticFillSource};
pub use what_if::WhatIfSimulator;

/// Optional constraints; each absent field skips its pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_position_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_timeout_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_fill_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_latency_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_multiplier: Option<f64>,
}

impl SimulationParameters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject values no stage can act on meaningfully
    pub fn validate(&self) -> AnalyticsResult<()> {
        check_positive("max_position_size", self.max_position_size)?;
        check_positive("order_timeout_ms", self.order_timeout_ms)?;
        check_positive("max_latency_ms", self.max_latency_ms)?;

        if let Some(rate) = self.min_fill_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(AnalyticsError::InvalidParameter(
                    "min_fill_rate".to_string(),
                    format!("{} is outside [0, 1]", rate),
                ));
            }
        }

        if let Some(multiplier) = self.risk_multiplier {
            if !multiplier.is_finite() || multiplier < 0.0 {
                return Err(AnalyticsError::InvalidParameter(
                    "risk_multiplier".to_string(),
                    format!("{} must be a non-negative number", multiplier),
                ));
            }
        }

        Ok(())
    }
}

fn check_positive(name: &str, value: Option<f64>) -> AnalyticsResult<()> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(AnalyticsError::InvalidParameter(
            name.to_string(),
            format!("{} must be greater than 0", v),
        )),
        _ => Ok(()),
    }
}

/// A named projection of strategy performance under a parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    pub id: String,
    pub name: String,
    pub strategy_id: String,
    pub parameters: SimulationParameters,
    pub projected_metrics: StrategyMetrics,
    pub created_at: DateTime<Utc>,
}

/// Per-scenario deltas against the first scenario of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDiff {
    pub scenario_id: String,
    pub name: String,
    pub pnl_diff: f64,
    pub fill_rate_diff: f64,
    pub latency_diff: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub best: WhatIfScenario,
    pub worst: WhatIfScenario,
    pub comparison: Vec<ScenarioDiff>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_parameters() {
        assert!(SimulationParameters::default().is_empty());
        let params = SimulationParameters { risk_multiplier: Some(2.0), ..Default::default() };
        assert!(!params.is_empty());
    }

    #[test]
    fn test_validate() {
        let ok = SimulationParameters {
            max_position_size: Some(100.0),
            min_fill_rate: Some(0.9),
            risk_multiplier: Some(0.0),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad_rate = SimulationParameters { min_fill_rate: Some(1.5), ..Default::default() };
        assert!(matches!(bad_rate.validate(), Err(AnalyticsError::InvalidParameter(name, _)) if name == "min_fill_rate"));

        let bad_timeout = SimulationParameters { order_timeout_ms: Some(0.0), ..Default::default() };
        assert!(bad_timeout.validate().is_err());
    }

    #[test]
    fn test_absent_fields_not_serialized() {
        let params = SimulationParameters { order_timeout_ms: Some(5000.0), ..Default::default() };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"order_timeout_ms":5000.0}"#);
        let parsed: SimulationParameters = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
