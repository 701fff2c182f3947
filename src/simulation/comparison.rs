// Scenario comparison

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::simulation::{ScenarioComparison, ScenarioDiff, WhatIfScenario};

/// Rank scenarios by projected P&L and diff each against the first one.
///
/// The baseline is always `scenarios[0]`, whatever its risk profile. On ties
/// the earliest scenario wins both `best` and `worst`.
pub fn compare_scenarios(scenarios: &[WhatIfScenario]) -> AnalyticsResult<ScenarioComparison> {
    let Some(baseline) = scenarios.first() else {
        return Err(AnalyticsError::EmptyInput(
            "at least one scenario is required for comparison".to_string(),
        ));
    };

    let mut best = baseline;
    let mut worst = baseline;
    for scenario in &scenarios[1..] {
        let pnl = scenario.projected_metrics.total_pnl;
        if pnl > best.projected_metrics.total_pnl {
            best = scenario;
        }
        if pnl < worst.projected_metrics.total_pnl {
            worst = scenario;
        }
    }

    let base = &baseline.projected_metrics;
    let comparison = scenarios
        .iter()
        .map(|scenario| {
            let metrics = &scenario.projected_metrics;
            ScenarioDiff {
                scenario_id: scenario.id.clone(),
                name: scenario.name.clone(),
                pnl_diff: metrics.total_pnl - base.total_pnl,
                fill_rate_diff: metrics.fill_rate - base.fill_rate,
                latency_diff: metrics.avg_latency_ms - base.avg_latency_ms,
            }
        })
        .collect();

    Ok(ScenarioComparison {
        best: best.clone(),
        worst: worst.clone(),
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{PerformanceMetrics, StrategyMetrics};
    use crate::simulation::SimulationParameters;
    use chrono::{NaiveDate, Utc};

    fn scenario(id: &str, pnl: f64, fill_rate: f64) -> WhatIfScenario {
        let metrics = PerformanceMetrics { total_pnl: pnl, fill_rate, ..Default::default() };
        WhatIfScenario {
            id: id.to_string(),
            name: id.to_string(),
            strategy_id: "S1".to_string(),
            parameters: SimulationParameters::default(),
            projected_metrics: StrategyMetrics::from_performance(
                "S1",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                (0, 0, 0),
                &metrics,
            ),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(compare_scenarios(&[]), Err(AnalyticsError::EmptyInput(_))));
    }

    #[test]
    fn test_best_worst_and_baseline() {
        let result = compare_scenarios(&[scenario("A", 100.0, 0.8), scenario("B", 150.0, 0.9)]).unwrap();
        assert_eq!(result.best.id, "B");
        assert_eq!(result.worst.id, "A");
        assert_eq!(result.comparison[0].pnl_diff, 0.0);
        assert_eq!(result.comparison[1].pnl_diff, 50.0);
        assert!((result.comparison[1].fill_rate_diff - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_single_scenario_is_best_and_worst() {
        let result = compare_scenarios(&[scenario("only", -5.0, 0.5)]).unwrap();
        assert_eq!(result.best.id, "only");
        assert_eq!(result.worst.id, "only");
        assert_eq!(result.comparison.len(), 1);
    }

    #[test]
    fn test_diff_serializes_camel_case() {
        let result = compare_scenarios(&[scenario("A", 1.0, 0.5)]).unwrap();
        let json = serde_json::to_string(&result.comparison[0]).unwrap();
        assert!(json.contains("\"pnlDiff\""));
        assert!(json.contains("\"fillRateDiff\""));
    }
}
