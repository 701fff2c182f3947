//! Statistical anomaly detection
//!
//! Four independent scans over a finite event snapshot. Each scan is pure
//! given the thresholds: it emits zero or more [`Anomaly`] records and keeps
//! no state between calls, so repeated calls on overlapping data will report
//! the same anomaly again. Deduplication and persistence belong to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::analytics::aggregator::{self, Reduction};
use crate::analytics::stats;
use crate::analytics::timeseries::{fill_rate_series, volume_series};
use crate::analytics::TimeSeriesPoint;
use crate::anomaly::{Anomaly, AnomalyThresholds, AnomalyType, DetectorSettings, Severity};
use crate::events::{new_event_id, Cancel, ExecutionEvent, Fill, LatencyMetricType, LatencySample, Reject};

/// Z-score above which a latency sample is always flagged
pub const LATENCY_Z_LIMIT: f64 = 3.0;

const LATENCY_Z_CUTOFFS: [f64; 3] = [2.0, 3.0, 4.0];
const REJECT_RATE_CUTOFFS: [f64; 3] = [0.10, 0.15, 0.25];
const VOLUME_RATIO_CUTOFFS: [f64; 3] = [2.0, 3.0, 5.0];
const FILL_DROP_PCT_CUTOFFS: [f64; 3] = [20.0, 40.0, 60.0];

/// Fill-rate drops are only reported for strategies whose average exceeds this
const MIN_BASELINE_FILL_RATE: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    thresholds: AnomalyThresholds,
    settings: DetectorSettings,
}

#[derive(Default)]
struct StrategyOrders {
    fills: Vec<Fill>,
    cancels: Vec<Cancel>,
    rejects: Vec<Reject>,
}

impl AnomalyDetector {
    pub fn new(thresholds: AnomalyThresholds) -> Self {
        Self { thresholds, settings: DetectorSettings::default() }
    }

    pub fn with_settings(mut self, settings: DetectorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn thresholds(&self) -> &AnomalyThresholds {
        &self.thresholds
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Run all four detectors; newest anomalies first
    ///
    /// Latency samples are scanned per strategy and metric type, so one
    /// strategy's samples never form another strategy's reference window.
    pub fn detect_all(
        &self,
        fills: &[Fill],
        cancels: &[Cancel],
        rejects: &[Reject],
        latency_samples: &[LatencySample],
    ) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        for samples in group_latency_samples(latency_samples).values() {
            anomalies.extend(self.detect_latency_spikes(samples));
        }
        anomalies.extend(self.detect_high_reject_rate(fills, cancels, rejects));
        anomalies.extend(self.detect_unusual_volume(fills));
        anomalies.extend(self.detect_fill_rate_drop(fills, cancels, rejects));

        // Stable: ties keep detector order
        anomalies.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        info!("Anomaly scan complete: {} anomalies", anomalies.len());
        anomalies
    }

    /// Flag samples far above the trailing window of preceding samples
    ///
    /// The window runs over every supplied sample in timestamp order; pass
    /// one series at a time or use [`AnomalyDetector::detect_all`].
    pub fn detect_latency_spikes(&self, samples: &[LatencySample]) -> Vec<Anomaly> {
        let window = self.settings.latency_window.max(1);
        if samples.len() < window {
            return Vec::new();
        }

        let mut ordered: Vec<&LatencySample> = samples.iter().collect();
        ordered.sort_by_key(|s| s.timestamp);
        let values: Vec<f64> = ordered.iter().map(|s| s.latency_ms).collect();

        let mut anomalies = Vec::new();
        for i in window..ordered.len() {
            let reference = &values[i - window..i];
            let mean = stats::mean(reference);
            let std_dev = stats::std_dev(reference).max(1.0);
            let current = values[i];
            let z_score = (current - mean) / std_dev;

            let exceeds_ceiling = current > self.thresholds.latency_spike_ms;
            if z_score <= LATENCY_Z_LIMIT && !exceeds_ceiling {
                continue;
            }

            let threshold_value = if exceeds_ceiling {
                self.thresholds.latency_spike_ms
            } else {
                mean + LATENCY_Z_LIMIT * std_dev
            };
            let sample = ordered[i];
            anomalies.push(new_anomaly(
                sample.timestamp,
                &sample.strategy_id,
                AnomalyType::LatencySpike,
                Severity::classify(z_score, LATENCY_Z_CUTOFFS),
                format!(
                    "Latency spike of {:.1}ms ({:.1} std devs above the trailing mean of {:.1}ms)",
                    current, z_score, mean
                ),
                current,
                threshold_value,
            ));
        }

        debug!("Latency spike scan: {} anomalies over {} samples", anomalies.len(), samples.len());
        anomalies
    }

    /// Flag windows where rejects make up too large a share of orders
    pub fn detect_high_reject_rate(&self, fills: &[Fill], cancels: &[Cancel], rejects: &[Reject]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for (strategy_id, orders) in group_by_strategy(fills, cancels, rejects) {
            // (timestamp, 1.0 for a reject)
            let outcomes: Vec<(DateTime<Utc>, f64)> = orders
                .fills
                .iter()
                .map(|f| (f.timestamp, 0.0))
                .chain(orders.cancels.iter().map(|c| (c.timestamp, 0.0)))
                .chain(orders.rejects.iter().map(|r| (r.timestamp, 1.0)))
                .collect();

            let window = self.settings.reject_window_minutes;
            let totals = aggregator::aggregate(&outcomes, |o| o.0, |o| o.1, window, Reduction::Count);
            let reject_counts = aggregator::aggregate(&outcomes, |o| o.0, |o| o.1, window, Reduction::Sum);

            for (total, rejected) in totals.iter().zip(reject_counts.iter()) {
                if (total.value as usize) < self.settings.min_window_events {
                    continue;
                }

                let rate = rejected.value / total.value;
                if rate <= self.thresholds.high_reject_rate {
                    continue;
                }

                anomalies.push(new_anomaly(
                    total.timestamp,
                    &strategy_id,
                    AnomalyType::HighRejectRate,
                    Severity::classify(rate, REJECT_RATE_CUTOFFS),
                    format!(
                        "Reject rate {:.1}% over {} orders exceeds {:.1}%",
                        rate * 100.0,
                        total.value as usize,
                        self.thresholds.high_reject_rate * 100.0
                    ),
                    rate,
                    self.thresholds.high_reject_rate,
                ));
            }
        }

        debug!("Reject rate scan: {} anomalies", anomalies.len());
        anomalies
    }

    /// Flag recent windows whose volume is a large multiple of the average
    pub fn detect_unusual_volume(&self, fills: &[Fill]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for (strategy_id, orders) in group_by_strategy(fills, &[], &[]) {
            let series = volume_series(&orders.fills, self.settings.volume_window_minutes);
            if series.len() < self.settings.min_baseline_windows {
                continue;
            }

            let mean = series_mean(&series);
            if mean <= 0.0 {
                continue;
            }

            let threshold = mean * self.thresholds.volume_multiplier;
            for point in recent(&series, self.settings.recent_windows) {
                if point.value <= threshold {
                    continue;
                }
                let ratio = point.value / mean;
                anomalies.push(new_anomaly(
                    point.timestamp,
                    &strategy_id,
                    AnomalyType::UnusualVolume,
                    Severity::classify(ratio, VOLUME_RATIO_CUTOFFS),
                    format!("Volume {:.0} is {:.1}x the average of {:.0}", point.value, ratio, mean),
                    point.value,
                    threshold,
                ));
            }
        }

        debug!("Volume scan: {} anomalies", anomalies.len());
        anomalies
    }

    /// Flag recent windows whose fill rate fell well below a healthy average
    pub fn detect_fill_rate_drop(&self, fills: &[Fill], cancels: &[Cancel], rejects: &[Reject]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();

        for (strategy_id, orders) in group_by_strategy(fills, cancels, rejects) {
            let series = fill_rate_series(
                &orders.fills,
                &orders.cancels,
                &orders.rejects,
                self.settings.fill_rate_window_minutes,
            );
            if series.len() < self.settings.min_baseline_windows {
                continue;
            }

            let mean = series_mean(&series);
            if mean <= MIN_BASELINE_FILL_RATE {
                continue;
            }

            let threshold = mean * self.thresholds.fill_rate_drop;
            for point in recent(&series, self.settings.recent_windows) {
                if point.value >= threshold {
                    continue;
                }
                let drop_pct = (mean - point.value) / mean * 100.0;
                anomalies.push(new_anomaly(
                    point.timestamp,
                    &strategy_id,
                    AnomalyType::FillRateDrop,
                    Severity::classify(drop_pct, FILL_DROP_PCT_CUTOFFS),
                    format!(
                        "Fill rate {:.1}% is {:.1}% below the average of {:.1}%",
                        point.value * 100.0,
                        drop_pct,
                        mean * 100.0
                    ),
                    point.value,
                    threshold,
                ));
            }
        }

        debug!("Fill rate scan: {} anomalies", anomalies.len());
        anomalies
    }
}

fn new_anomaly(
    timestamp: DateTime<Utc>,
    strategy_id: &str,
    anomaly_type: AnomalyType,
    severity: Severity,
    description: String,
    metric_value: f64,
    threshold_value: f64,
) -> Anomaly {
    Anomaly {
        id: new_event_id(),
        timestamp,
        strategy_id: strategy_id.to_string(),
        anomaly_type,
        severity,
        description,
        metric_value,
        threshold_value,
        detected_at: Utc::now(),
    }
}

/// Orders grouped per strategy, in strategy id order
fn group_by_strategy(
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
) -> BTreeMap<String, StrategyOrders> {
    let mut groups: BTreeMap<String, StrategyOrders> = BTreeMap::new();
    for fill in fills {
        groups.entry(fill.strategy_id().to_string()).or_default().fills.push(fill.clone());
    }
    for cancel in cancels {
        groups.entry(cancel.strategy_id().to_string()).or_default().cancels.push(cancel.clone());
    }
    for reject in rejects {
        groups.entry(reject.strategy_id().to_string()).or_default().rejects.push(reject.clone());
    }
    groups
}

/// Latency samples keyed by (strategy, metric type)
fn group_latency_samples(samples: &[LatencySample]) -> BTreeMap<(String, LatencyMetricType), Vec<LatencySample>> {
    let mut groups: BTreeMap<(String, LatencyMetricType), Vec<LatencySample>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry((sample.strategy_id.clone(), sample.metric_type))
            .or_default()
            .push(sample.clone());
    }
    groups
}

fn series_mean(series: &[TimeSeriesPoint]) -> f64 {
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    stats::mean(&values)
}

fn recent(series: &[TimeSeriesPoint], count: usize) -> &[TimeSeriesPoint] {
    &series[series.len().saturating_sub(count)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Side;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 5, 9, 30, 0).unwrap()
    }

    fn sample(second: i64, latency_ms: f64) -> LatencySample {
        LatencySample {
            id: format!("l{}", second),
            timestamp: base() + Duration::seconds(second),
            strategy_id: "S1".into(),
            metric_type: LatencyMetricType::OrderToFill,
            latency_ms,
            percentile_50: None,
            percentile_95: None,
            percentile_99: None,
        }
    }

    fn fill(minute: i64, quantity: f64) -> Fill {
        Fill {
            id: format!("f{}", minute),
            timestamp: base() + Duration::minutes(minute),
            strategy_id: "S1".into(),
            symbol: "SPY".into(),
            side: Side::Buy,
            quantity,
            price: 500.0,
            venue: "ARCA".into(),
            latency_ms: 10.0,
            order_id: format!("o{}", minute),
        }
    }

    fn reject(minute: i64) -> Reject {
        Reject {
            id: format!("r{}", minute),
            timestamp: base() + Duration::minutes(minute),
            strategy_id: "S1".into(),
            symbol: "SPY".into(),
            order_id: format!("ro{}", minute),
            reason: "Price outside collar".into(),
            error_code: "E204".into(),
        }
    }

    #[test]
    fn test_latency_needs_full_window() {
        let samples: Vec<LatencySample> = (0..19).map(|i| sample(i, 500.0)).collect();
        assert!(AnomalyDetector::default().detect_latency_spikes(&samples).is_empty());
    }

    #[test]
    fn test_latency_spike_by_z_score() {
        let mut samples: Vec<LatencySample> = (0..20).map(|i| sample(i, 20.0 + (i % 3) as f64)).collect();
        samples.push(sample(20, 120.0));

        let anomalies = AnomalyDetector::default().detect_latency_spikes(&samples);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::Critical);
        assert_eq!(anomalies[0].metric_value, 120.0);
        assert!(anomalies[0].threshold_value < 120.0);
    }

    #[test]
    fn test_latency_spike_by_ceiling_only() {
        // Noisy reference keeps the z-score low, but the ceiling is crossed
        let mut samples: Vec<LatencySample> =
            (0..20).map(|i| sample(i, if i % 2 == 0 { 60.0 } else { 200.0 })).collect();
        samples.push(sample(20, 160.0));

        let anomalies = AnomalyDetector::default().detect_latency_spikes(&samples);
        let last = anomalies.iter().find(|a| a.timestamp == base() + Duration::seconds(20)).unwrap();
        assert_eq!(last.threshold_value, 150.0);
        assert_eq!(last.severity, Severity::Low);
    }

    #[test]
    fn test_reject_rate_noise_guard() {
        // 4 events, all rejected: below the minimum window population
        let rejects: Vec<Reject> = (0..4).map(reject).collect();
        assert!(AnomalyDetector::default().detect_high_reject_rate(&[], &[], &rejects).is_empty());
    }

    #[test]
    fn test_reject_rate_flagged() {
        let fills: Vec<Fill> = (0..6).map(|i| fill(i, 10.0)).collect();
        let rejects: Vec<Reject> = (10..14).map(reject).collect();

        let anomalies = AnomalyDetector::default().detect_high_reject_rate(&fills, &[], &rejects);
        assert_eq!(anomalies.len(), 1);
        assert!((anomalies[0].metric_value - 0.4).abs() < 1e-12);
        assert_eq!(anomalies[0].severity, Severity::Critical);
        assert_eq!(anomalies[0].threshold_value, 0.15);
    }

    #[test]
    fn test_volume_needs_baseline() {
        let fills: Vec<Fill> = (0..4).map(|h| fill(h * 60, 100.0)).collect();
        assert!(AnomalyDetector::default().detect_unusual_volume(&fills).is_empty());
    }

    #[test]
    fn test_unusual_volume_in_recent_window() {
        let mut fills: Vec<Fill> = (0..9).map(|h| fill(h * 60, 100.0)).collect();
        fills.push(fill(9 * 60, 2000.0));

        let anomalies = AnomalyDetector::default().detect_unusual_volume(&fills);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].metric_value, 2000.0);
        // mean = 2900 / 10 = 290, ratio ~ 6.9
        assert_eq!(anomalies[0].severity, Severity::Critical);
    }
}
