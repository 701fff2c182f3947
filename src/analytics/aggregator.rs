//! Time-window aggregation
//!
//! Buckets timestamped records into fixed-width windows keyed by
//! `floor(timestamp_ms / width_ms)` and reduces each bucket to a scalar.
//! Only non-empty windows are emitted, ascending by window start. Grouping
//! goes through an ordered map, so the output does not depend on input order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::analytics::TimeSeriesPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Number of records in the window
    Count,
    /// Sum of the selected values
    Sum,
    /// Arithmetic mean of the selected values
    Average,
}

/// Window width in milliseconds; a zero width is treated as one minute
pub fn window_ms(window_minutes: u32) -> i64 {
    i64::from(window_minutes.max(1)) * 60_000
}

pub fn window_key(timestamp: DateTime<Utc>, width_ms: i64) -> i64 {
    timestamp.timestamp_millis().div_euclid(width_ms)
}

pub fn window_start(key: i64, width_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(key.checked_mul(width_ms)?)
}

/// Aggregate `records` into one point per non-empty window
pub fn aggregate<T, FT, FV>(
    records: &[T],
    timestamp: FT,
    value: FV,
    window_minutes: u32,
    reduction: Reduction,
) -> Vec<TimeSeriesPoint>
where
    FT: Fn(&T) -> DateTime<Utc>,
    FV: Fn(&T) -> f64,
{
    let width_ms = window_ms(window_minutes);
    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();

    for record in records {
        let entry = buckets
            .entry(window_key(timestamp(record), width_ms))
            .or_insert((0.0, 0));
        entry.0 += value(record);
        entry.1 += 1;
    }

    trace!("Aggregated {} records into {} windows", records.len(), buckets.len());

    buckets
        .into_iter()
        .filter_map(|(key, (sum, count))| {
            let value = match reduction {
                Reduction::Count => count as f64,
                Reduction::Sum => sum,
                Reduction::Average => sum / count as f64,
            };
            window_start(key, width_ms).map(|timestamp| TimeSeriesPoint { timestamp, value })
        })
        .collect()
}

/// Records per window
pub fn count_series<T, FT>(records: &[T], timestamp: FT, window_minutes: u32) -> Vec<TimeSeriesPoint>
where
    FT: Fn(&T) -> DateTime<Utc>,
{
    aggregate(records, timestamp, |_| 1.0, window_minutes, Reduction::Count)
}

/// Running total of a per-window series
pub fn cumulative(points: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut running = 0.0;
    points
        .iter()
        .map(|point| {
            running += point.value;
            TimeSeriesPoint { timestamp: point.timestamp, value: running }
        })
        .collect()
}
