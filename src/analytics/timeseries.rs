// Metric time series for charting and anomaly detection

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::aggregator::{self, Reduction};
use crate::analytics::metrics::cumulative_pnl;
use crate::analytics::TimeSeriesPoint;
use crate::events::{Cancel, Fill, LatencySample, Reject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    FillRate,
    Latency,
    Volume,
    Pnl,
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeriesKind::FillRate => "fillRate",
            SeriesKind::Latency => "latency",
            SeriesKind::Volume => "volume",
            SeriesKind::Pnl => "pnl",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SeriesKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "fillrate" => Ok(SeriesKind::FillRate),
            "latency" => Ok(SeriesKind::Latency),
            "volume" => Ok(SeriesKind::Volume),
            "pnl" => Ok(SeriesKind::Pnl),
            other => Err(format!(
                "unknown series '{}', expected one of: fillRate, latency, volume, pnl",
                other
            )),
        }
    }
}

/// Build the requested series over the supplied events
pub fn compute_time_series(
    kind: SeriesKind,
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
    latency_samples: &[LatencySample],
    window_minutes: u32,
) -> Vec<TimeSeriesPoint> {
    match kind {
        SeriesKind::FillRate => fill_rate_series(fills, cancels, rejects, window_minutes),
        SeriesKind::Latency => aggregator::aggregate(
            latency_samples,
            |s| s.timestamp,
            |s| s.latency_ms,
            window_minutes,
            Reduction::Average,
        ),
        SeriesKind::Volume => volume_series(fills, window_minutes),
        SeriesKind::Pnl => cumulative_pnl(fills, window_minutes),
    }
}

/// Filled quantity per window
pub fn volume_series(fills: &[Fill], window_minutes: u32) -> Vec<TimeSeriesPoint> {
    aggregator::aggregate(fills, |f| f.timestamp, |f| f.quantity, window_minutes, Reduction::Sum)
}

/// Share of orders that filled, per window containing at least one order
pub fn fill_rate_series(
    fills: &[Fill],
    cancels: &[Cancel],
    rejects: &[Reject],
    window_minutes: u32,
) -> Vec<TimeSeriesPoint> {
    // The mean of a 1/0 fill indicator over a window is fills / orders
    let outcomes: Vec<(DateTime<Utc>, f64)> = fills
        .iter()
        .map(|f| (f.timestamp, 1.0))
        .chain(cancels.iter().map(|c| (c.timestamp, 0.0)))
        .chain(rejects.iter().map(|r| (r.timestamp, 0.0)))
        .collect();

    aggregator::aggregate(&outcomes, |o| o.0, |o| o.1, window_minutes, Reduction::Average)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_kind() {
        assert_eq!("fillRate".parse::<SeriesKind>().unwrap(), SeriesKind::FillRate);
        assert_eq!("fill-rate".parse::<SeriesKind>().unwrap(), SeriesKind::FillRate);
        assert_eq!("PNL".parse::<SeriesKind>().unwrap(), SeriesKind::Pnl);
        assert!("sharpe".parse::<SeriesKind>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in [SeriesKind::FillRate, SeriesKind::Latency, SeriesKind::Volume, SeriesKind::Pnl] {
            assert_eq!(kind.to_string().parse::<SeriesKind>().unwrap(), kind);
        }
    }
}
