// Performance Metrics Calculation

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::analytics::aggregator::{self, Reduction};
use crate::analytics::stats;
use crate::analytics::{PerformanceMetrics, StrategyMetrics, TimeSeriesPoint};
use crate::events::{filter_strategy, Cancel, Fill, LatencySample, Reject};

/// Trading days used to de-annualise the risk-free rate
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Window width of the cumulative P&L series behind Sharpe and drawdown
pub const PNL_WINDOW_MINUTES: u32 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyProfile {
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyProfile {
    pub fn from_samples(samples: &[LatencySample]) -> Self {
        let values: Vec<f64> = samples.iter().map(|s| s.latency_ms).collect();
        Self::from_values(&values)
    }

    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let sorted = stats::sorted(values);
        Self {
            avg: stats::mean(&sorted),
            p50: stats::percentile(&sorted, 0.50),
            p95: stats::percentile(&sorted, 0.95),
            p99: stats::percentile(&sorted, 0.99),
        }
    }
}

/// Stateless calculator turning an event set into performance statistics
#[derive(Debug, Clone)]
pub struct PerformanceAnalyzer {
    annual_risk_free_rate: f64,
    pnl_window_minutes: u32,
}

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self {
            annual_risk_free_rate: 0.02, // 2% annual risk-free rate
            pnl_window_minutes: PNL_WINDOW_MINUTES,
        }
    }

    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.annual_risk_free_rate = rate;
        self
    }

    pub fn with_pnl_window(mut self, window_minutes: u32) -> Self {
        self.pnl_window_minutes = window_minutes.max(1);
        self
    }

    pub fn annual_risk_free_rate(&self) -> f64 {
        self.annual_risk_free_rate
    }

    /// Compute all performance metrics of an event set
    pub fn compute(
        &self,
        fills: &[Fill],
        cancels: &[Cancel],
        rejects: &[Reject],
        latency_samples: &[LatencySample],
    ) -> PerformanceMetrics {
        let (fill_rate, cancel_rate, reject_rate) = order_rates(fills.len(), cancels.len(), rejects.len());
        let latency = LatencyProfile::from_samples(latency_samples);
        let total_volume: f64 = fills.iter().map(|f| f.quantity).sum();

        let pnl = self.pnl_series(fills);
        let total_pnl = pnl.last().map(|p| p.value).unwrap_or(0.0);

        PerformanceMetrics {
            fill_rate,
            cancel_rate,
            reject_rate,
            avg_latency: latency.avg,
            p50_latency: latency.p50,
            p95_latency: latency.p95,
            p99_latency: latency.p99,
            total_volume,
            total_pnl,
            sharpe_ratio: self.sharpe_ratio(&pnl),
            max_drawdown: max_drawdown(&pnl),
        }
    }

    /// Metrics for one strategy's subset, stamped with today's date
    pub fn strategy_metrics(
        &self,
        strategy_id: &str,
        fills: &[Fill],
        cancels: &[Cancel],
        rejects: &[Reject],
        latency_samples: &[LatencySample],
    ) -> StrategyMetrics {
        self.strategy_metrics_on(
            strategy_id,
            Utc::now().date_naive(),
            fills,
            cancels,
            rejects,
            latency_samples,
        )
    }

    pub fn strategy_metrics_on(
        &self,
        strategy_id: &str,
        date: NaiveDate,
        fills: &[Fill],
        cancels: &[Cancel],
        rejects: &[Reject],
        latency_samples: &[LatencySample],
    ) -> StrategyMetrics {
        let fills = filter_strategy(fills, strategy_id);
        let cancels = filter_strategy(cancels, strategy_id);
        let rejects = filter_strategy(rejects, strategy_id);
        let latency_samples = filter_strategy(latency_samples, strategy_id);

        let metrics = self.compute(&fills, &cancels, &rejects, &latency_samples);
        debug!(
            "Strategy {}: {} fills, {} cancels, {} rejects, pnl {:.2}",
            strategy_id,
            fills.len(),
            cancels.len(),
            rejects.len(),
            metrics.total_pnl
        );

        StrategyMetrics::from_performance(
            strategy_id,
            date,
            (fills.len(), cancels.len(), rejects.len()),
            &metrics,
        )
    }

    /// Cumulative cash-flow P&L, one point per non-empty window
    pub fn pnl_series(&self, fills: &[Fill]) -> Vec<TimeSeriesPoint> {
        cumulative_pnl(fills, self.pnl_window_minutes)
    }

    /// Sharpe ratio of window-over-window returns of a cumulative P&L series
    pub fn sharpe_ratio(&self, cumulative_pnl: &[TimeSeriesPoint]) -> f64 {
        if cumulative_pnl.len() < 2 {
            return 0.0;
        }

        let returns = window_returns(cumulative_pnl);
        let std_dev = stats::std_dev(&returns);
        if std_dev == 0.0 || !std_dev.is_finite() {
            return 0.0;
        }

        let daily_risk_free = self.annual_risk_free_rate / TRADING_DAYS_PER_YEAR;
        (stats::mean(&returns) - daily_risk_free) / std_dev
    }
}

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill, cancel and reject shares of all orders; all zero when there are no orders
pub fn order_rates(fills: usize, cancels: usize, rejects: usize) -> (f64, f64, f64) {
    let total = fills + cancels + rejects;
    if total == 0 {
        return (0.0, 0.0, 0.0);
    }
    let total = total as f64;
    (fills as f64 / total, cancels as f64 / total, rejects as f64 / total)
}

pub fn cumulative_pnl(fills: &[Fill], window_minutes: u32) -> Vec<TimeSeriesPoint> {
    let per_window = aggregator::aggregate(
        fills,
        |f| f.timestamp,
        Fill::signed_notional,
        window_minutes,
        Reduction::Sum,
    );
    aggregator::cumulative(&per_window)
}

/// (P[n] - P[n-1]) / |P[n-1]|, dividing by 1 when the previous value is zero
pub fn window_returns(cumulative_pnl: &[TimeSeriesPoint]) -> Vec<f64> {
    cumulative_pnl
        .windows(2)
        .map(|pair| {
            let previous = pair[0].value;
            let base = if previous == 0.0 { 1.0 } else { previous.abs() };
            (pair[1].value - previous) / base
        })
        .collect()
}

/// Largest (peak - value) / |peak| over the series, never negative
pub fn max_drawdown(cumulative_pnl: &[TimeSeriesPoint]) -> f64 {
    let Some(first) = cumulative_pnl.first() else {
        return 0.0;
    };

    let mut peak = first.value;
    let mut max_drawdown: f64 = 0.0;

    for point in cumulative_pnl {
        if point.value > peak {
            peak = point.value;
        }
        let base = if peak == 0.0 { 1.0 } else { peak.abs() };
        max_drawdown = max_drawdown.max((peak - point.value) / base);
    }

    max_drawdown
}
