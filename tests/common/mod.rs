// Common test utilities and helpers
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use execution_monitor::{
    Cancel, ExecutionEvents, Fill, LatencyMetricType, LatencySample, Reject, Side, Strategy, StrategyStatus,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Start of a window-aligned trading hour
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap()
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(seconds)
}

pub fn fill(strategy_id: &str, seconds: i64, side: Side, quantity: f64, price: f64, latency_ms: f64) -> Fill {
    Fill {
        id: format!("f-{}-{}", strategy_id, seconds),
        timestamp: at(seconds),
        strategy_id: strategy_id.to_string(),
        symbol: "AAPL".to_string(),
        side,
        quantity,
        price,
        venue: "NASDAQ".to_string(),
        latency_ms,
        order_id: format!("o-{}-{}", strategy_id, seconds),
    }
}

pub fn cancel(strategy_id: &str, seconds: i64) -> Cancel {
    Cancel {
        id: format!("c-{}-{}", strategy_id, seconds),
        timestamp: at(seconds),
        strategy_id: strategy_id.to_string(),
        symbol: "AAPL".to_string(),
        order_id: format!("oc-{}-{}", strategy_id, seconds),
        reason: "Price moved".to_string(),
        latency_ms: 15.0,
    }
}

pub fn reject(strategy_id: &str, seconds: i64) -> Reject {
    Reject {
        id: format!("r-{}-{}", strategy_id, seconds),
        timestamp: at(seconds),
        strategy_id: strategy_id.to_string(),
        symbol: "AAPL".to_string(),
        order_id: format!("or-{}-{}", strategy_id, seconds),
        reason: "Insufficient buying power".to_string(),
        error_code: "E101".to_string(),
    }
}

pub fn latency(strategy_id: &str, seconds: i64, latency_ms: f64) -> LatencySample {
    LatencySample {
        id: format!("l-{}-{}", strategy_id, seconds),
        timestamp: at(seconds),
        strategy_id: strategy_id.to_string(),
        metric_type: LatencyMetricType::OrderToFill,
        latency_ms,
        percentile_50: None,
        percentile_95: None,
        percentile_99: None,
    }
}

pub fn strategy(id: &str) -> Strategy {
    Strategy {
        id: id.to_string(),
        name: format!("Strategy {}", id),
        description: String::new(),
        status: StrategyStatus::Active,
        created_at: base_time() - Duration::days(7),
    }
}

/// One hour of "S1" activity: 100 fills at 20ms with a single 300ms outlier
/// (index 50), 10 cancels and 5 rejects, plus one latency sample per fill.
pub fn one_hour_scenario() -> ExecutionEvents {
    let mut fills = Vec::new();
    let mut samples = Vec::new();
    for i in 0..100 {
        let seconds = i * 36;
        let latency_ms = if i == 50 { 300.0 } else { 20.0 };
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        let price = 180.0 + (i % 7) as f64 * 0.25;
        fills.push(fill("S1", seconds, side, 10.0, price, latency_ms));
        samples.push(latency("S1", seconds, latency_ms));
    }

    let cancels = (0..10).map(|i| cancel("S1", 30 + i * 355)).collect();
    let rejects = (0..5).map(|i| reject("S1", 60 + i * 700)).collect();

    ExecutionEvents::new(fills, cancels, rejects, samples)
}

/// Create a temporary directory holding a file path for snapshots or configs
pub fn create_temp_file(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
