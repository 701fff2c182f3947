// Sample execution data
// Seeded generator for demo snapshots and tests

use chrono::{DateTime, Duration, DurationRound, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::events::{
    new_event_id, Cancel, EventSnapshot, ExecutionEvents, Fill, LatencyMetricType, LatencySample,
    Reject, Side, Strategy, StrategyStatus,
};

const STRATEGY_NAMES: [&str; 6] = [
    "Momentum Alpha",
    "Mean Reversion",
    "Stat Arb Pairs",
    "VWAP Slicer",
    "Market Maker",
    "Opening Auction",
];

const VENUES: [&str; 4] = ["NASDAQ", "NYSE", "ARCA", "BATS"];

const CANCEL_REASONS: [&str; 3] = ["User requested", "Price moved", "Strategy signal reversed"];

const REJECT_REASONS: [(&str, &str); 3] = [
    ("Insufficient buying power", "E101"),
    ("Price outside collar", "E204"),
    ("Venue throttled", "E429"),
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub start: DateTime<Utc>,
    pub hours: i64,
    pub strategies: usize,
    pub orders_per_hour: usize,
    pub symbols: Vec<(String, f64)>, // (symbol, reference price)
    pub cancel_probability: f64,
    pub reject_probability: f64,
    pub latency_outlier_probability: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        let now = Utc::now();
        let hour_start = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
        Self {
            seed: 42,
            start: hour_start - Duration::hours(24),
            hours: 24,
            strategies: 3,
            orders_per_hour: 40,
            symbols: vec![
                ("AAPL".to_string(), 190.0),
                ("MSFT".to_string(), 410.0),
                ("NVDA".to_string(), 880.0),
                ("SPY".to_string(), 510.0),
            ],
            cancel_probability: 0.10,
            reject_probability: 0.04,
            latency_outlier_probability: 0.01,
        }
    }
}

pub struct SampleGenerator {
    config: SampleConfig,
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new(config: SampleConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn strategies(&self) -> Vec<Strategy> {
        (0..self.config.strategies)
            .map(|i| Strategy {
                id: format!("S{}", i + 1),
                name: STRATEGY_NAMES[i % STRATEGY_NAMES.len()].to_string(),
                description: String::new(),
                status: StrategyStatus::Active,
                created_at: self.config.start,
            })
            .collect()
    }

    /// Generate a full snapshot: strategies plus their event streams
    pub fn generate(&mut self) -> EventSnapshot {
        let strategies = self.strategies();
        let mut events = ExecutionEvents::default();

        for strategy in &strategies {
            let generated = self.generate_strategy(&strategy.id);
            events.fills.extend(generated.fills);
            events.cancels.extend(generated.cancels);
            events.rejects.extend(generated.rejects);
            events.latency_samples.extend(generated.latency_samples);
        }

        EventSnapshot {
            strategies,
            fills: events.fills,
            cancels: events.cancels,
            rejects: events.rejects,
            latency_samples: events.latency_samples,
            anomalies: Vec::new(),
        }
    }

    /// Generate the event streams of a single strategy, each sorted by time
    pub fn generate_strategy(&mut self, strategy_id: &str) -> ExecutionEvents {
        let mut events = ExecutionEvents::default();
        let mut prices: Vec<(String, f64)> = self.config.symbols.clone();
        let total_orders = self.config.hours.max(0) as usize * self.config.orders_per_hour;
        let span_ms = (self.config.hours.max(1) * 3_600_000) as f64;

        let mut offsets: Vec<f64> = (0..total_orders)
            .map(|_| self.rng.gen_range(0.0..span_ms))
            .collect();
        offsets.sort_by(|a, b| a.total_cmp(b));

        for offset in offsets {
            let timestamp = self.config.start + Duration::milliseconds(offset as i64);
            let order_id = new_event_id();
            let symbol_index = self.rng.gen_range(0..prices.len().max(1));
            let Some((symbol, price)) = prices.get_mut(symbol_index) else {
                break;
            };

            // Random walk around the reference price
            *price *= 1.0 + self.rng.gen_range(-0.002..0.002);
            let latency_ms = self.sample_latency();
            let roll: f64 = self.rng.gen();

            if roll < self.config.reject_probability {
                let (reason, code) = REJECT_REASONS
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(REJECT_REASONS[0]);
                events.rejects.push(Reject {
                    id: new_event_id(),
                    timestamp,
                    strategy_id: strategy_id.to_string(),
                    symbol: symbol.clone(),
                    order_id,
                    reason: reason.to_string(),
                    error_code: code.to_string(),
                });
            } else if roll < self.config.reject_probability + self.config.cancel_probability {
                let reason = CANCEL_REASONS.choose(&mut self.rng).copied().unwrap_or("Cancelled");
                events.cancels.push(Cancel {
                    id: new_event_id(),
                    timestamp,
                    strategy_id: strategy_id.to_string(),
                    symbol: symbol.clone(),
                    order_id,
                    reason: reason.to_string(),
                    latency_ms,
                });
            } else {
                let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
                let quantity = self.rng.gen_range(1..=20) as f64 * 10.0;
                let venue = VENUES.choose(&mut self.rng).copied().unwrap_or("NASDAQ");
                events.fills.push(Fill {
                    id: new_event_id(),
                    timestamp,
                    strategy_id: strategy_id.to_string(),
                    symbol: symbol.clone(),
                    side,
                    quantity,
                    price: (*price * 100.0).round() / 100.0,
                    venue: venue.to_string(),
                    latency_ms,
                    order_id,
                });
                events.latency_samples.push(LatencySample {
                    id: new_event_id(),
                    timestamp,
                    strategy_id: strategy_id.to_string(),
                    metric_type: LatencyMetricType::OrderToFill,
                    latency_ms,
                    percentile_50: None,
                    percentile_95: None,
                    percentile_99: None,
                });
            }

            if self.rng.gen_bool(0.1) {
                let metric_type = if self.rng.gen_bool(0.5) {
                    LatencyMetricType::MarketData
                } else {
                    LatencyMetricType::SignalToOrder
                };
                let latency_ms = self.rng.gen_range(0.5..5.0);
                events.latency_samples.push(LatencySample {
                    id: new_event_id(),
                    timestamp,
                    strategy_id: strategy_id.to_string(),
                    metric_type,
                    latency_ms,
                    percentile_50: None,
                    percentile_95: None,
                    percentile_99: None,
                });
            }
        }

        events
    }

    fn sample_latency(&mut self) -> f64 {
        let latency = if self.rng.gen_bool(self.config.latency_outlier_probability.clamp(0.0, 1.0)) {
            self.rng.gen_range(200.0..500.0)
        } else {
            self.rng.gen_range(8.0..35.0)
        };
        (latency * 10.0_f64).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> SampleConfig {
        SampleConfig {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            hours: 6,
            strategies: 2,
            orders_per_hour: 30,
            ..SampleConfig::default()
        }
    }

    #[test]
    fn test_generates_every_order() {
        let snapshot = SampleGenerator::new(config()).generate();
        let orders = snapshot.fills.len() + snapshot.cancels.len() + snapshot.rejects.len();
        assert_eq!(snapshot.strategies.len(), 2);
        assert_eq!(orders, 2 * 6 * 30);
        assert!(snapshot.fills.iter().all(|f| f.quantity > 0.0 && f.price > 0.0));
    }

    #[test]
    fn test_same_seed_same_shape() {
        let a = SampleGenerator::new(config()).generate();
        let b = SampleGenerator::new(config()).generate();
        assert_eq!(a.fills.len(), b.fills.len());
        let prices_a: Vec<f64> = a.fills.iter().map(|f| f.price).collect();
        let prices_b: Vec<f64> = b.fills.iter().map(|f| f.price).collect();
        assert_eq!(prices_a, prices_b);
    }
}
