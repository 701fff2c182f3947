// Anomaly detection over execution metrics
// Classified, auditable anomaly records produced by the detector

pub mod detector;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use detector::AnomalyDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    LatencySpike,
    HighRejectRate,
    UnusualVolume,
    FillRateDrop,
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnomalyType::LatencySpike => "latency_spike",
            AnomalyType::HighRejectRate => "high_reject_rate",
            AnomalyType::UnusualVolume => "unusual_volume",
            AnomalyType::FillRateDrop => "fill_rate_drop",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Bucket `value` against ascending `[medium, high, critical]` cutoffs
    pub fn classify(value: f64, cutoffs: [f64; 3]) -> Self {
        if value > cutoffs[2] {
            Severity::Critical
        } else if value > cutoffs[1] {
            Severity::High
        } else if value > cutoffs[0] {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    /// Start of the triggering window, or the triggering sample's time
    pub timestamp: DateTime<Utc>,
    pub strategy_id: String,
    pub anomaly_type: AnomalyType,
    pub severity: Severity,
    pub description: String,
    pub metric_value: f64,
    pub threshold_value: f64,
    pub detected_at: DateTime<Utc>,
}

/// Trigger levels of the four detectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Absolute latency ceiling in milliseconds
    pub latency_spike_ms: f64,
    /// Reject share of a window above which it is flagged
    pub high_reject_rate: f64,
    /// Fraction of the mean fill rate below which a window is flagged
    pub fill_rate_drop: f64,
    /// Multiple of the mean volume above which a window is flagged
    pub volume_multiplier: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            latency_spike_ms: 150.0,
            high_reject_rate: 0.15,
            fill_rate_drop: 0.6,
            volume_multiplier: 3.0,
        }
    }
}

/// Window sizes and noise guards of the detectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Samples preceding the current one used as the z-score reference
    pub latency_window: usize,
    pub reject_window_minutes: u32,
    /// Windows with fewer events are skipped by the reject-rate scan
    pub min_window_events: usize,
    pub volume_window_minutes: u32,
    pub fill_rate_window_minutes: u32,
    /// Trailing windows inspected by the volume and fill-rate scans
    pub recent_windows: usize,
    /// Windows required before a volume or fill-rate baseline exists
    pub min_baseline_windows: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            latency_window: 20,
            reject_window_minutes: 60,
            min_window_events: 5,
            volume_window_minutes: 60,
            fill_rate_window_minutes: 60,
            recent_windows: 5,
            min_baseline_windows: 5,
        }
    }
}
