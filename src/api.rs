//! Public analytics surface
//!
//! Free functions over caller-supplied event slices, plus [`AnalyticsService`]
//! which fetches snapshots from an [`EventStore`], runs the core over them and
//! records detected anomalies back into the store.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::analytics::{PerformanceAnalyzer, PerformanceMetrics, SeriesKind, StrategyMetrics, TimeSeriesPoint};
use crate::anomaly::{Anomaly, AnomalyDetector, AnomalyThresholds};
use crate::config::Config;
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::events::{Cancel, EventStore, Fill, LatencySample, Reject};
use crate::simulation::{ScenarioComparison, SimulationParameters, WhatIfScenario, WhatIfSimulator};

pub use crate::analytics::compute_time_series;
pub use crate::simulation::compare_scenarios;

pub fn compute_performance_metrics(
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
    latency_samples: &[LatencySample],
) -> PerformanceMetrics {
    PerformanceAnalyzer::default().compute(fills, cancels, rejects, latency_samples)
}

pub fn compute_strategy_metrics(
    strategy_id: &str,
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
    latency_samples: &[LatencySample],
) -> StrategyMetrics {
    PerformanceAnalyzer::default().strategy_metrics(strategy_id, fills, cancels, rejects, latency_samples)
}

/// Run every detector; `None` uses the default thresholds
pub fn detect_anomalies(
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
    latency_samples: &[LatencySample],
    thresholds: Option<AnomalyThresholds>,
) -> Vec<Anomaly> {
    AnomalyDetector::new(thresholds.unwrap_or_default()).detect_all(fills, cancels, rejects, latency_samples)
}

pub fn simulate_scenario(
    strategy_id: &str,
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
    latency_samples: &[LatencySample],
    parameters: &SimulationParameters,
) -> WhatIfScenario {
    WhatIfSimulator::default().simulate(strategy_id, fills, cancels, rejects, latency_samples, parameters)
}

/// Binds an event store to the analytics core using one configuration
pub struct AnalyticsService<S: EventStore> {
    store: S,
    config: Config,
    analyzer: PerformanceAnalyzer,
    detector: AnomalyDetector,
    simulator: WhatIfSimulator,
}

impl<S: EventStore> AnalyticsService<S> {
    pub fn new(store: S, config: Config) -> Self {
        let analyzer = config.analyzer();
        let detector = config.detector();
        let simulator = config.simulator();
        Self { store, config, analyzer, detector, simulator }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Strategy ids known to the store or referenced by any order event
    pub fn strategy_ids(&self) -> Vec<String> {
        let events = self.store.get_events(None);
        let mut ids: BTreeSet<String> = self.store.get_strategies().into_iter().map(|s| s.id).collect();
        ids.extend(events.fills.into_iter().map(|f| f.strategy_id));
        ids.extend(events.cancels.into_iter().map(|c| c.strategy_id));
        ids.extend(events.rejects.into_iter().map(|r| r.strategy_id));
        ids.into_iter().collect()
    }

    fn ensure_strategy(&self, strategy_id: &str) -> AnalyticsResult<()> {
        if self.store.get_strategy(strategy_id).is_some() {
            return Ok(());
        }
        let has_orders = !self.store.get_fills(Some(strategy_id), Some(1)).is_empty()
            || !self.store.get_cancels(Some(strategy_id), Some(1)).is_empty()
            || !self.store.get_rejects(Some(strategy_id), Some(1)).is_empty();
        if has_orders {
            Ok(())
        } else {
            Err(AnalyticsError::StrategyNotFound(strategy_id.to_string()))
        }
    }

    /// Metrics for one strategy or, with `None`, every event in the store
    pub fn performance_metrics(&self, strategy_id: Option<&str>) -> AnalyticsResult<PerformanceMetrics> {
        if let Some(id) = strategy_id {
            self.ensure_strategy(id)?;
        }
        let events = self.store.get_events(strategy_id);
        Ok(self.analyzer.compute(
            &events.fills,
            &events.cancels,
            &events.rejects,
            &events.latency_samples,
        ))
    }

    pub fn strategy_metrics(&self, strategy_id: &str) -> AnalyticsResult<StrategyMetrics> {
        self.ensure_strategy(strategy_id)?;
        let events = self.store.get_events(Some(strategy_id));
        Ok(self.analyzer.strategy_metrics(
            strategy_id,
            &events.fills,
            &events.cancels,
            &events.rejects,
            &events.latency_samples,
        ))
    }

    /// Metric series for one strategy or, with `None`, across all strategies
    pub fn time_series(
        &self,
        strategy_id: Option<&str>,
        kind: SeriesKind,
        window_minutes: Option<u32>,
    ) -> AnalyticsResult<Vec<TimeSeriesPoint>> {
        if let Some(id) = strategy_id {
            self.ensure_strategy(id)?;
        }
        let events = self.store.get_events(strategy_id);
        let window = window_minutes.unwrap_or(self.config.analytics.default_window_minutes);
        Ok(compute_time_series(
            kind,
            &events.fills,
            &events.cancels,
            &events.rejects,
            &events.latency_samples,
            window,
        ))
    }

    /// Detect anomalies and persist each one through the store
    pub fn detect_and_record(&mut self, strategy_id: Option<&str>) -> AnalyticsResult<Vec<Anomaly>> {
        if let Some(id) = strategy_id {
            self.ensure_strategy(id)?;
        }
        let events = self.store.get_events(strategy_id);
        let anomalies = self.detector.detect_all(
            &events.fills,
            &events.cancels,
            &events.rejects,
            &events.latency_samples,
        );

        for anomaly in &anomalies {
            if self.config.logging.log_anomalies {
                warn!(
                    "[{}] {} {} at {}: {}",
                    anomaly.severity, anomaly.strategy_id, anomaly.anomaly_type, anomaly.timestamp, anomaly.description
                );
            }
            self.store.add_anomaly(anomaly.clone());
        }

        Ok(anomalies)
    }

    pub fn simulate(&self, strategy_id: &str, parameters: &SimulationParameters) -> AnalyticsResult<WhatIfScenario> {
        self.ensure_strategy(strategy_id)?;
        parameters.validate()?;
        let events = self.store.get_events(Some(strategy_id));
        Ok(self.simulator.simulate(
            strategy_id,
            &events.fills,
            &events.cancels,
            &events.rejects,
            &events.latency_samples,
            parameters,
        ))
    }

    /// Simulate each parameter set, then compare against the first
    pub fn compare(
        &self,
        strategy_id: &str,
        parameter_sets: &[SimulationParameters],
    ) -> AnalyticsResult<(Vec<WhatIfScenario>, ScenarioComparison)> {
        let scenarios = parameter_sets
            .iter()
            .map(|params| self.simulate(strategy_id, params))
            .collect::<AnalyticsResult<Vec<_>>>()?;
        let comparison = compare_scenarios(&scenarios)?;
        Ok((scenarios, comparison))
    }
}

impl<S: EventStore + Sync> AnalyticsService<S> {
    /// Metrics for every strategy, computed in parallel
    pub fn all_strategy_metrics<F>(&self, on_done: F) -> Vec<StrategyMetrics>
    where
        F: Fn(&StrategyMetrics) + Sync + Send,
    {
        let ids = self.strategy_ids();
        let events = self.store.get_events(None);
        info!("Computing metrics for {} strategies", ids.len());

        ids.par_iter()
            .map(|id| {
                let metrics = self.analyzer.strategy_metrics(
                    id,
                    &events.fills,
                    &events.cancels,
                    &events.rejects,
                    &events.latency_samples,
                );
                on_done(&metrics);
                metrics
            })
            .collect()
    }
}
