// Execution analytics
// Windowed aggregation, performance statistics and time series over event snapshots

pub mod aggregator;
pub mod stats;
pub mod metrics;
pub mod timeseries;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use aggregator::Reduction;
pub use metrics::{LatencyProfile, PerformanceAnalyzer};
pub use timeseries::{compute_time_series, fill_rate_series, SeriesKind};

/// One non-empty window of a series, stamped with the window start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Point-in-time performance statistics of an event set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub fill_rate: f64,
    pub cancel_rate: f64,
    pub reject_rate: f64,
    pub avg_latency: f64,
    pub p50_latency: f64,
    pub p95_latency: f64,
    pub p99_latency: f64,
    pub total_volume: f64,
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

/// Per-strategy snapshot summary, snake_case for external consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub strategy_id: String,
    pub date: NaiveDate,
    pub total_fills: usize,
    pub total_cancels: usize,
    pub total_rejects: usize,
    pub fill_rate: f64,
    pub cancel_rate: f64,
    pub reject_rate: f64,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub p99_latency_ms: f64,
    pub total_volume: f64,
    pub total_pnl: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl StrategyMetrics {
    pub fn from_performance(
        strategy_id: &str,
        date: NaiveDate,
        counts: (usize, usize, usize),
        metrics: &PerformanceMetrics,
    ) -> Self {
        let (total_fills, total_cancels, total_rejects) = counts;
        Self {
            strategy_id: strategy_id.to_string(),
            date,
            total_fills,
            total_cancels,
            total_rejects,
            fill_rate: metrics.fill_rate,
            cancel_rate: metrics.cancel_rate,
            reject_rate: metrics.reject_rate,
            avg_latency_ms: metrics.avg_latency,
            p50_latency_ms: metrics.p50_latency,
            p95_latency_ms: metrics.p95_latency,
            p99_latency_ms: metrics.p99_latency,
            total_volume: metrics.total_volume,
            total_pnl: metrics.total_pnl,
            sharpe_ratio: metrics.sharpe_ratio,
            max_drawdown: metrics.max_drawdown,
        }
    }

    pub fn total_orders(&self) -> usize {
        self.total_fills + self.total_cancels + self.total_rejects
    }
}
