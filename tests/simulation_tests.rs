// Integration tests for what-if simulation and scenario comparison

mod common;

use common::*;
use execution_monitor::simulation::synthetic::SIMULATED_VENUE;
use execution_monitor::{
    compare_scenarios, compute_strategy_metrics, simulate_scenario, AnalyticsError, Cancel, Fill,
    PerformanceAnalyzer, Side, SimulationParameters, SyntheticFillConfig, SyntheticFillSource, WhatIfScenario,
    WhatIfSimulator,
};

fn params() -> SimulationParameters {
    SimulationParameters::default()
}

/// Deterministic source stamping every synthetic fill with one price
struct FixedPriceFills {
    price: f64,
    calls: usize,
}

impl SyntheticFillSource for FixedPriceFills {
    fn synthesize(&mut self, cancel: &Cancel, _reference_price: Option<f64>) -> Fill {
        self.calls += 1;
        Fill {
            id: format!("synthetic-{}", self.calls),
            timestamp: cancel.timestamp,
            strategy_id: cancel.strategy_id.clone(),
            symbol: cancel.symbol.clone(),
            side: Side::Sell,
            quantity: 1.0,
            price: self.price,
            venue: SIMULATED_VENUE.to_string(),
            latency_ms: cancel.latency_ms,
            order_id: cancel.order_id.clone(),
        }
    }
}

#[test]
fn test_empty_parameters_reproduce_strategy_metrics() {
    let events = one_hour_scenario();

    let scenario = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &params());
    let mut expected = compute_strategy_metrics("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples);
    expected.date = scenario.projected_metrics.date;

    assert_eq!(scenario.projected_metrics, expected);
    assert_eq!(scenario.name, "Default Scenario");
    assert_eq!(scenario.strategy_id, "S1");
}

#[test]
fn test_position_limit_drops_breaching_fill() {
    let fills = vec![
        fill("S1", 0, Side::Buy, 30.0, 10.0, 5.0),
        fill("S1", 60, Side::Buy, 40.0, 10.0, 5.0),
        fill("S1", 120, Side::Buy, 20.0, 10.0, 5.0),
    ];
    let parameters = SimulationParameters { max_position_size: Some(50.0), ..params() };

    let scenario = simulate_scenario("S1", &fills, &[], &[], &[], &parameters);

    // 30 fits, 30 + 40 = 70 breaches, 30 + 20 = 50 fits
    assert_eq!(scenario.projected_metrics.total_fills, 2);
    assert!(approx_eq(scenario.projected_metrics.total_volume, 50.0));
    assert_eq!(scenario.name, "MaxPos:50");
}

#[test]
fn test_position_limit_nets_sells_against_buys() {
    let fills = vec![
        fill("S1", 0, Side::Buy, 40.0, 10.0, 5.0),
        fill("S1", 60, Side::Sell, 30.0, 10.0, 5.0),
        fill("S1", 120, Side::Buy, 35.0, 10.0, 5.0),
        fill("S1", 180, Side::Sell, 100.0, 10.0, 5.0),
    ];
    let parameters = SimulationParameters { max_position_size: Some(50.0), ..params() };

    let scenario = simulate_scenario("S1", &fills, &[], &[], &[], &parameters);

    // Net position runs 40, 10, 45; the final sell would reach -55
    assert_eq!(scenario.projected_metrics.total_fills, 3);
    assert!(approx_eq(scenario.projected_metrics.total_volume, 105.0));
}

#[test]
fn test_timeout_converts_slow_fills() {
    let events = one_hour_scenario();
    let parameters = SimulationParameters { order_timeout_ms: Some(100.0), ..params() };

    let scenario = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &parameters);
    let metrics = &scenario.projected_metrics;

    assert_eq!(metrics.total_fills, 99);
    assert_eq!(metrics.total_cancels, 11);
    assert_eq!(metrics.total_rejects, 5);
    assert_eq!(metrics.total_orders(), 115);
}

#[test]
fn test_max_latency_converts_slow_fills() {
    let events = one_hour_scenario();
    let parameters = SimulationParameters { max_latency_ms: Some(19.0), ..params() };

    let scenario = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &parameters);

    assert_eq!(scenario.projected_metrics.total_fills, 0);
    assert_eq!(scenario.projected_metrics.total_cancels, 110);
    assert_eq!(scenario.projected_metrics.total_pnl, 0.0);
}

#[test]
fn test_min_fill_rate_adds_synthetic_fills() {
    let fills = vec![
        fill("S1", 0, Side::Buy, 10.0, 50.0, 5.0),
        fill("S1", 60, Side::Sell, 10.0, 51.0, 5.0),
    ];
    let cancels: Vec<_> = (0..8).map(|i| cancel("S1", 120 + i * 60)).collect();
    let parameters = SimulationParameters { min_fill_rate: Some(0.7), ..params() };

    let mut source = FixedPriceFills { price: 52.0, calls: 0 };
    let scenario = WhatIfSimulator::default().simulate_with("S1", &fills, &cancels, &[], &[], &parameters, &mut source);

    assert_eq!(source.calls, 5);
    assert_eq!(scenario.projected_metrics.total_fills, 7);
    assert_eq!(scenario.projected_metrics.total_cancels, 3);
    assert!(approx_eq(scenario.projected_metrics.fill_rate, 0.7));
    // -500 + 510 + 5 synthetic sells of 1 @ 52
    assert!(approx_eq(scenario.projected_metrics.total_pnl, 270.0));
}

#[test]
fn test_min_fill_rate_already_met() {
    let events = one_hour_scenario();
    let parameters = SimulationParameters { min_fill_rate: Some(0.5), ..params() };

    let scenario = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &parameters);

    assert_eq!(scenario.projected_metrics.total_fills, 100);
    assert_eq!(scenario.projected_metrics.total_cancels, 10);
}

#[test]
fn test_seeded_synthetic_fills_are_reproducible() {
    let fills = vec![fill("S1", 0, Side::Buy, 10.0, 50.0, 5.0)];
    let cancels: Vec<_> = (0..9).map(|i| cancel("S1", 60 + i * 60)).collect();
    let parameters = SimulationParameters { min_fill_rate: Some(0.9), ..params() };
    let simulator = WhatIfSimulator::new(
        PerformanceAnalyzer::default(),
        SyntheticFillConfig { seed: 7, ..Default::default() },
    );

    let first = simulator.simulate("S1", &fills, &cancels, &[], &[], &parameters);
    let second = simulator.simulate("S1", &fills, &cancels, &[], &[], &parameters);

    assert_eq!(first.projected_metrics, second.projected_metrics);
    assert_eq!(first.projected_metrics.total_fills, 9);
}

#[test]
fn test_risk_multiplier_scales_pnl_and_volume() {
    let events = one_hour_scenario();
    let base = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &params());
    let parameters = SimulationParameters { risk_multiplier: Some(2.0), ..params() };
    let scaled = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &parameters);

    assert!(approx_eq(scaled.projected_metrics.total_pnl, base.projected_metrics.total_pnl * 2.0));
    assert!(approx_eq(scaled.projected_metrics.total_volume, base.projected_metrics.total_volume * 2.0));
    assert_eq!(scaled.projected_metrics.fill_rate, base.projected_metrics.fill_rate);
    assert_eq!(scaled.projected_metrics.sharpe_ratio, base.projected_metrics.sharpe_ratio);
}

#[test]
fn test_inputs_are_not_mutated() {
    let events = one_hour_scenario();
    let before = events.clone();
    let parameters = SimulationParameters {
        max_position_size: Some(20.0),
        order_timeout_ms: Some(100.0),
        min_fill_rate: Some(0.95),
        max_latency_ms: Some(50.0),
        risk_multiplier: Some(0.5),
    };

    simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &parameters);

    assert_eq!(events, before);
}

#[test]
fn test_scenario_name_lists_set_parameters() {
    let events = one_hour_scenario();
    let parameters = SimulationParameters {
        max_position_size: Some(100.0),
        order_timeout_ms: Some(5000.0),
        min_fill_rate: Some(0.7),
        max_latency_ms: Some(250.0),
        risk_multiplier: Some(1.5),
    };

    let scenario = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &parameters);

    assert_eq!(
        scenario.name,
        "MaxPos:100 | Timeout:5000ms | MinFillRate:70% | MaxLatency:250ms | Risk:1.5x"
    );
    assert_eq!(scenario.parameters, parameters);
}

fn scenario_with_pnl(pnl: f64) -> WhatIfScenario {
    let events = one_hour_scenario();
    let mut scenario = simulate_scenario("S1", &events.fills, &events.cancels, &events.rejects, &events.latency_samples, &params());
    scenario.projected_metrics.total_pnl = pnl;
    scenario
}

#[test]
fn test_compare_picks_best_and_worst() {
    let a = scenario_with_pnl(100.0);
    let b = scenario_with_pnl(150.0);

    let result = compare_scenarios(&[a.clone(), b.clone()]).unwrap();

    assert_eq!(result.best.id, b.id);
    assert_eq!(result.worst.id, a.id);
    assert_eq!(result.comparison.len(), 2);
    assert_eq!(result.comparison[0].pnl_diff, 0.0);
    assert_eq!(result.comparison[1].pnl_diff, 50.0);
    assert_eq!(result.comparison[1].scenario_id, b.id);
}

#[test]
fn test_compare_single_scenario() {
    let only = scenario_with_pnl(42.0);
    let result = compare_scenarios(std::slice::from_ref(&only)).unwrap();

    assert_eq!(result.best.id, only.id);
    assert_eq!(result.worst.id, only.id);
    assert_eq!(result.comparison[0].pnl_diff, 0.0);
}

#[test]
fn test_compare_empty_is_error() {
    let result = compare_scenarios(&[]);
    assert!(matches!(result, Err(AnalyticsError::EmptyInput(_))));
}

#[test]
fn test_comparison_serializes_camel_case() {
    let result = compare_scenarios(&[scenario_with_pnl(1.0), scenario_with_pnl(2.0)]).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["comparison"][1].get("pnlDiff").is_some());
    assert!(json["comparison"][1].get("fillRateDiff").is_some());
    assert!(json["best"]["projected_metrics"].get("total_pnl").is_some());
}
