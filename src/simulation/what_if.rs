//! What-if scenario projection
//!
//! Historical events pass through the constraint stages in a fixed order,
//! each consuming the previous stage's output:
//!
//! 1. position-size limit (drop fills that would breach it)
//! 2. order timeout (slow fills become "Timeout" cancels)
//! 3. minimum fill rate (oldest cancels become synthetic fills)
//! 4. maximum latency (slow fills become "High latency" cancels)
//! 5. risk multiplier (scales projected P&L and volume)
//!
//! The transformed sets are then measured with [`PerformanceAnalyzer`].
//! Inputs are never mutated; every stage works on its own copies.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analytics::metrics::order_rates;
use crate::analytics::PerformanceAnalyzer;
use crate::events::{filter_strategy, new_event_id, Cancel, Fill, LatencySample, Reject};
use crate::simulation::synthetic::{SeededFillGenerator, SyntheticFillConfig, SyntheticFillSource};
use crate::simulation::{SimulationParameters, WhatIfScenario};

pub const TIMEOUT_REASON: &str = "Timeout";
pub const HIGH_LATENCY_REASON: &str = "High latency";
pub const DEFAULT_SCENARIO_NAME: &str = "Default Scenario";

#[derive(Debug, Clone, Default)]
pub struct WhatIfSimulator {
    analyzer: PerformanceAnalyzer,
    fill_config: SyntheticFillConfig,
}

impl WhatIfSimulator {
    pub fn new(analyzer: PerformanceAnalyzer, fill_config: SyntheticFillConfig) -> Self {
        Self { analyzer, fill_config }
    }

    /// Project a strategy's metrics under `parameters`, seeding synthetic fills from config
    pub fn simulate(
        &self,
        strategy_id: &str,
        fills: &[Fill],
        cancels: &[Cancel],
        rejects: &[Reject],
        latency_samples: &[LatencySample],
        parameters: &SimulationParameters,
    ) -> WhatIfScenario {
        let mut source = SeededFillGenerator::new(self.fill_config.clone());
        self.simulate_with(strategy_id, fills, cancels, rejects, latency_samples, parameters, &mut source)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn simulate_with(
        &self,
        strategy_id: &str,
        fills: &[Fill],
        cancels: &[Cancel],
        rejects: &[Reject],
        latency_samples: &[LatencySample],
        parameters: &SimulationParameters,
        source: &mut dyn SyntheticFillSource,
    ) -> WhatIfScenario {
        let mut fills = filter_strategy(fills, strategy_id);
        let mut cancels = filter_strategy(cancels, strategy_id);
        let rejects = filter_strategy(rejects, strategy_id);
        let latency_samples = filter_strategy(latency_samples, strategy_id);

        if let Some(limit) = parameters.max_position_size {
            fills = apply_position_limit(fills, limit);
        }

        if let Some(timeout_ms) = parameters.order_timeout_ms {
            let (kept, converted) = convert_slow_fills(fills, timeout_ms, TIMEOUT_REASON);
            fills = kept;
            cancels.extend(converted);
        }

        if let Some(target) = parameters.min_fill_rate {
            let (new_fills, new_cancels) = apply_min_fill_rate(fills, cancels, rejects.len(), target, source);
            fills = new_fills;
            cancels = new_cancels;
        }

        if let Some(max_latency_ms) = parameters.max_latency_ms {
            let (kept, converted) = convert_slow_fills(fills, max_latency_ms, HIGH_LATENCY_REASON);
            fills = kept;
            cancels.extend(converted);
        }

        let mut projected_metrics =
            self.analyzer
                .strategy_metrics(strategy_id, &fills, &cancels, &rejects, &latency_samples);

        if let Some(multiplier) = parameters.risk_multiplier {
            projected_metrics.total_pnl *= multiplier;
            projected_metrics.total_volume *= multiplier;
        }

        let name = scenario_name(parameters);
        info!(
            "Simulated '{}' for {}: {} fills, {} cancels, projected pnl {:.2}",
            name,
            strategy_id,
            fills.len(),
            cancels.len(),
            projected_metrics.total_pnl
        );

        WhatIfScenario {
            id: Uuid::new_v4().to_string(),
            name,
            strategy_id: strategy_id.to_string(),
            parameters: parameters.clone(),
            projected_metrics,
            created_at: Utc::now(),
        }
    }
}

/// Replay fills in time order, dropping any that would push |position| over `limit`
pub fn apply_position_limit(mut fills: Vec<Fill>, limit: f64) -> Vec<Fill> {
    fills.sort_by_key(|f| f.timestamp);

    let before = fills.len();
    let mut position = 0.0;
    fills.retain(|fill| {
        let next = position + fill.side.sign() * fill.quantity;
        if next.abs() <= limit {
            position = next;
            true
        } else {
            false
        }
    });

    debug!("Position limit {}: dropped {} of {} fills", limit, before - fills.len(), before);
    fills
}

/// Split fills into those within `ceiling_ms` and synthetic cancels for the rest
pub fn convert_slow_fills(fills: Vec<Fill>, ceiling_ms: f64, reason: &str) -> (Vec<Fill>, Vec<Cancel>) {
    let (slow, kept): (Vec<Fill>, Vec<Fill>) = fills.into_iter().partition(|f| f.latency_ms > ceiling_ms);

    let converted: Vec<Cancel> = slow
        .into_iter()
        .map(|fill| Cancel {
            id: new_event_id(),
            timestamp: fill.timestamp,
            strategy_id: fill.strategy_id,
            symbol: fill.symbol,
            order_id: fill.order_id,
            reason: reason.to_string(),
            latency_ms: ceiling_ms,
        })
        .collect();

    debug!("{} ceiling {}ms: converted {} fills to cancels", reason, ceiling_ms, converted.len());
    (kept, converted)
}

/// Convert the oldest cancels into synthetic fills until the fill rate reaches `target`
pub fn apply_min_fill_rate(
    mut fills: Vec<Fill>,
    mut cancels: Vec<Cancel>,
    reject_count: usize,
    target: f64,
    source: &mut dyn SyntheticFillSource,
) -> (Vec<Fill>, Vec<Cancel>) {
    let (fill_rate, _, _) = order_rates(fills.len(), cancels.len(), reject_count);
    if fill_rate >= target {
        return (fills, cancels);
    }

    let total_orders = fills.len() + cancels.len() + reject_count;
    // Nudge below the product so 0.7 * 10 does not round up to 8
    let required = (target * total_orders as f64 - 1e-9).ceil().max(0.0) as usize;
    let shortfall = required.saturating_sub(fills.len()).min(cancels.len());
    if shortfall == 0 {
        return (fills, cancels);
    }

    let mut reference_prices: HashMap<String, (chrono::DateTime<Utc>, f64)> = HashMap::new();
    for fill in &fills {
        let entry = reference_prices
            .entry(fill.symbol.clone())
            .or_insert((fill.timestamp, fill.price));
        if fill.timestamp >= entry.0 {
            *entry = (fill.timestamp, fill.price);
        }
    }

    cancels.sort_by_key(|c| c.timestamp);
    let remaining = cancels.split_off(shortfall);
    for cancel in &cancels {
        let reference = reference_prices.get(&cancel.symbol).map(|(_, price)| *price);
        fills.push(source.synthesize(cancel, reference));
    }

    debug!(
        "Min fill rate {:.3}: converted {} cancels to synthetic fills (was {:.3})",
        target, shortfall, fill_rate
    );
    (fills, remaining)
}

/// Deterministic label built from the parameters that are set
pub fn scenario_name(parameters: &SimulationParameters) -> String {
    let mut parts = Vec::new();

    if let Some(limit) = parameters.max_position_size {
        parts.push(format!("MaxPos:{}", tidy(limit)));
    }
    if let Some(timeout_ms) = parameters.order_timeout_ms {
        parts.push(format!("Timeout:{}ms", tidy(timeout_ms)));
    }
    if let Some(rate) = parameters.min_fill_rate {
        parts.push(format!("MinFillRate:{}%", tidy(rate * 100.0)));
    }
    if let Some(latency_ms) = parameters.max_latency_ms {
        parts.push(format!("MaxLatency:{}ms", tidy(latency_ms)));
    }
    if let Some(multiplier) = parameters.risk_multiplier {
        parts.push(format!("Risk:{}x", tidy(multiplier)));
    }

    if parts.is_empty() {
        DEFAULT_SCENARIO_NAME.to_string()
    } else {
        parts.join(" | ")
    }
}

// Round away float noise such as 70.00000000000001 before display
fn tidy(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
