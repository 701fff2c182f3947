//! Event store collaborator
//!
//! The analytics core never reads or writes storage itself. Callers fetch a
//! finite snapshot through [`EventStore`], run the core over it, and persist
//! any anomalies the detector returns.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anomaly::Anomaly;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::events::{Cancel, ExecutionEvent, ExecutionEvents, Fill, LatencySample, Reject, Strategy};

/// Read side returns newest-first, optionally capped to `limit` records
pub trait EventStore {
    fn get_fills(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Fill>;
    fn get_cancels(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Cancel>;
    fn get_rejects(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Reject>;
    fn get_latency_samples(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<LatencySample>;
    fn get_strategies(&self) -> Vec<Strategy>;
    fn get_strategy(&self, id: &str) -> Option<Strategy>;
    fn add_anomaly(&mut self, anomaly: Anomaly);
    fn get_anomalies(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Anomaly>;

    /// All four streams for one strategy (or every strategy), uncapped
    fn get_events(&self, strategy_id: Option<&str>) -> ExecutionEvents {
        ExecutionEvents::new(
            self.get_fills(strategy_id, None),
            self.get_cancels(strategy_id, None),
            self.get_rejects(strategy_id, None),
            self.get_latency_samples(strategy_id, None),
        )
    }
}

/// On-disk JSON layout of a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventSnapshot {
    #[serde(default)]
    pub strategies: Vec<Strategy>,
    #[serde(default)]
    pub fills: Vec<Fill>,
    #[serde(default)]
    pub cancels: Vec<Cancel>,
    #[serde(default)]
    pub rejects: Vec<Reject>,
    #[serde(default)]
    pub latency_samples: Vec<LatencySample>,
    #[serde(default)]
    pub anomalies: Vec<Anomaly>,
}

/// Vector-backed store, loadable from and savable to a JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    snapshot: EventSnapshot,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: EventSnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a store from a JSON snapshot file
    pub fn load_json<P: AsRef<Path>>(path: P) -> AnalyticsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnalyticsError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let snapshot: EventSnapshot = serde_json::from_str(&content)?;
        debug!(
            "Loaded snapshot {}: {} strategies, {} fills, {} cancels, {} rejects, {} latency samples",
            path.display(),
            snapshot.strategies.len(),
            snapshot.fills.len(),
            snapshot.cancels.len(),
            snapshot.rejects.len(),
            snapshot.latency_samples.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the store to a JSON snapshot file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> AnalyticsResult<()> {
        let content = serde_json::to_string_pretty(&self.snapshot)?;
        fs::write(path.as_ref(), content)
            .map_err(|e| AnalyticsError::FileWrite(format!("{}: {}", path.as_ref().display(), e)))?;
        Ok(())
    }

    pub fn add_strategy(&mut self, strategy: Strategy) {
        self.snapshot.strategies.retain(|s| s.id != strategy.id);
        self.snapshot.strategies.push(strategy);
    }

    pub fn add_fill(&mut self, fill: Fill) {
        self.snapshot.fills.push(fill);
    }

    pub fn add_cancel(&mut self, cancel: Cancel) {
        self.snapshot.cancels.push(cancel);
    }

    pub fn add_reject(&mut self, reject: Reject) {
        self.snapshot.rejects.push(reject);
    }

    pub fn add_latency_sample(&mut self, sample: LatencySample) {
        self.snapshot.latency_samples.push(sample);
    }

    pub fn extend(&mut self, events: ExecutionEvents) {
        self.snapshot.fills.extend(events.fills);
        self.snapshot.cancels.extend(events.cancels);
        self.snapshot.rejects.extend(events.rejects);
        self.snapshot.latency_samples.extend(events.latency_samples);
    }
}

fn newest_first<T: ExecutionEvent + Clone>(
    records: &[T],
    strategy_id: Option<&str>,
    limit: Option<usize>,
) -> Vec<T> {
    let mut selected: Vec<T> = records
        .iter()
        .filter(|r| strategy_id.map_or(true, |id| r.strategy_id() == id))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

impl EventStore for InMemoryEventStore {
    fn get_fills(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Fill> {
        newest_first(&self.snapshot.fills, strategy_id, limit)
    }

    fn get_cancels(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Cancel> {
        newest_first(&self.snapshot.cancels, strategy_id, limit)
    }

    fn get_rejects(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Reject> {
        newest_first(&self.snapshot.rejects, strategy_id, limit)
    }

    fn get_latency_samples(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<LatencySample> {
        newest_first(&self.snapshot.latency_samples, strategy_id, limit)
    }

    fn get_strategies(&self) -> Vec<Strategy> {
        self.snapshot.strategies.clone()
    }

    fn get_strategy(&self, id: &str) -> Option<Strategy> {
        self.snapshot.strategies.iter().find(|s| s.id == id).cloned()
    }

    fn add_anomaly(&mut self, anomaly: Anomaly) {
        self.snapshot.anomalies.push(anomaly);
    }

    fn get_anomalies(&self, strategy_id: Option<&str>, limit: Option<usize>) -> Vec<Anomaly> {
        let mut selected: Vec<Anomaly> = self
            .snapshot
            .anomalies
            .iter()
            .filter(|a| strategy_id.map_or(true, |id| a.strategy_id == id))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        if let Some(limit) = limit {
            selected.truncate(limit);
        }
        selected
    }
}
