// Synthetic fills for the minimum-fill-rate stage
// Injected source so projections are reproducible for a given seed

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::events::{new_event_id, Cancel, Fill, Side};

/// Venue stamped on every fill the simulator invents
pub const SIMULATED_VENUE: &str = "SIMULATED";

/// Turns a cancelled order into the fill it might have been
pub trait SyntheticFillSource {
    fn synthesize(&mut self, cancel: &Cancel, reference_price: Option<f64>) -> Fill;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticFillConfig {
    pub seed: u64,
    pub min_quantity: f64,
    pub max_quantity: f64,
    /// Price jitter around the reference, in percent either side
    pub price_jitter_pct: f64,
    /// Used when no fill for the symbol exists to anchor the price
    pub fallback_price: f64,
}

impl Default for SyntheticFillConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            min_quantity: 1.0,
            max_quantity: 100.0,
            price_jitter_pct: 0.5,
            fallback_price: 100.0,
        }
    }
}

pub struct SeededFillGenerator {
    config: SyntheticFillConfig,
    rng: StdRng,
}

impl SeededFillGenerator {
    pub fn new(config: SyntheticFillConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    fn quantity(&mut self) -> f64 {
        let low = self.config.min_quantity.max(1.0).round();
        let high = self.config.max_quantity.round().max(low);
        if high > low {
            self.rng.gen_range(low..=high).round()
        } else {
            low
        }
    }

    fn price(&mut self, reference_price: Option<f64>) -> f64 {
        let reference = reference_price
            .filter(|p| *p > 0.0)
            .unwrap_or(self.config.fallback_price);
        let jitter = self.config.price_jitter_pct.abs() / 100.0;
        let factor = if jitter > 0.0 {
            1.0 + self.rng.gen_range(-jitter..=jitter)
        } else {
            1.0
        };
        ((reference * factor) * 100.0).round() / 100.0
    }
}

impl SyntheticFillSource for SeededFillGenerator {
    fn synthesize(&mut self, cancel: &Cancel, reference_price: Option<f64>) -> Fill {
        let side = if self.rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
        let quantity = self.quantity();
        let price = self.price(reference_price);

        Fill {
            id: new_event_id(),
            timestamp: cancel.timestamp,
            strategy_id: cancel.strategy_id.clone(),
            symbol: cancel.symbol.clone(),
            side,
            quantity,
            price,
            venue: SIMULATED_VENUE.to_string(),
            latency_ms: cancel.latency_ms,
            order_id: cancel.order_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cancel() -> Cancel {
        Cancel {
            id: "c1".into(),
            timestamp: Utc::now(),
            strategy_id: "S1".into(),
            symbol: "NVDA".into(),
            order_id: "o1".into(),
            reason: "Price moved".into(),
            latency_ms: 14.0,
        }
    }

    #[test]
    fn test_synthetic_fill_shape() {
        let mut generator = SeededFillGenerator::new(SyntheticFillConfig::default());
        let fill = generator.synthesize(&cancel(), Some(880.0));

        assert_eq!(fill.venue, SIMULATED_VENUE);
        assert_eq!(fill.order_id, "o1");
        assert!(fill.quantity >= 1.0 && fill.quantity <= 100.0);
        assert!(fill.price >= 880.0 * 0.995 - 0.01 && fill.price <= 880.0 * 1.005 + 0.01);
    }

    #[test]
    fn test_same_seed_same_fills() {
        let config = SyntheticFillConfig { seed: 7, ..Default::default() };
        let mut a = SeededFillGenerator::new(config.clone());
        let mut b = SeededFillGenerator::new(config);
        for _ in 0..10 {
            let fa = a.synthesize(&cancel(), None);
            let fb = b.synthesize(&cancel(), None);
            assert_eq!((fa.side, fa.quantity, fa.price), (fb.side, fb.quantity, fb.price));
        }
    }

    #[test]
    fn test_fallback_price() {
        let config = SyntheticFillConfig { price_jitter_pct: 0.0, fallback_price: 42.0, ..Default::default() };
        let mut generator = SeededFillGenerator::new(config);
        assert_eq!(generator.synthesize(&cancel(), None).price, 42.0);
    }
}
