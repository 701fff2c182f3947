// Execution event model
// Raw input alphabet of the analytics core: fills, cancels, rejects, latency samples

pub mod store;
pub mod sample;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use store::{EventStore, EventSnapshot, InMemoryEventStore};
pub use sample::{SampleConfig, SampleGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Signed position change: buys add, sells subtract
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyMetricType {
    OrderToFill,
    MarketData,
    SignalToOrder,
}

/// A completed trade execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy_id: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub venue: String,
    pub latency_ms: f64,
    pub order_id: String,
}

impl Fill {
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }

    /// Cash-flow P&L contribution: sells are inflows, buys are outflows
    pub fn signed_notional(&self) -> f64 {
        -self.side.sign() * self.notional()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancel {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy_id: String,
    pub symbol: String,
    pub order_id: String,
    pub reason: String,
    pub latency_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reject {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy_id: String,
    pub symbol: String,
    pub order_id: String,
    pub reason: String,
    pub error_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy_id: String,
    pub metric_type: LatencyMetricType,
    pub latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_50: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_95: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile_99: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    Active,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: StrategyStatus,
    pub created_at: DateTime<Utc>,
}

/// Anything that happened at a point in time for a strategy
pub trait ExecutionEvent {
    fn timestamp(&self) -> DateTime<Utc>;
    fn strategy_id(&self) -> &str;
}

macro_rules! impl_execution_event {
    ($($ty:ty),*) => {
        $(
            impl ExecutionEvent for $ty {
                fn timestamp(&self) -> DateTime<Utc> {
                    self.timestamp
                }

                fn strategy_id(&self) -> &str {
                    &self.strategy_id
                }
            }
        )*
    };
}

impl_execution_event!(Fill, Cancel, Reject, LatencySample);

/// Owned snapshot of the four event streams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEvents {
    #[serde(default)]
    pub fills: Vec<Fill>,
    #[serde(default)]
    pub cancels: Vec<Cancel>,
    #[serde(default)]
    pub rejects: Vec<Reject>,
    #[serde(default)]
    pub latency_samples: Vec<LatencySample>,
}

impl ExecutionEvents {
    pub fn new(
        fills: Vec<Fill>,
        cancels: Vec<Cancel>,
        rejects: Vec<Reject>,
        latency_samples: Vec<LatencySample>,
    ) -> Self {
        Self { fills, cancels, rejects, latency_samples }
    }

    /// Copy of the subset belonging to one strategy
    pub fn for_strategy(&self, strategy_id: &str) -> Self {
        Self {
            fills: filter_strategy(&self.fills, strategy_id),
            cancels: filter_strategy(&self.cancels, strategy_id),
            rejects: filter_strategy(&self.rejects, strategy_id),
            latency_samples: filter_strategy(&self.latency_samples, strategy_id),
        }
    }

    pub fn total_orders(&self) -> usize {
        self.fills.len() + self.cancels.len() + self.rejects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_orders() == 0 && self.latency_samples.is_empty()
    }
}

pub fn filter_strategy<T: ExecutionEvent + Clone>(events: &[T], strategy_id: &str) -> Vec<T> {
    events
        .iter()
        .filter(|e| e.strategy_id() == strategy_id)
        .cloned()
        .collect()
}

/// New opaque event identifier
pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
