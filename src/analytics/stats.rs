// Descriptive statistics shared by the metrics engine and the anomaly detector.
// All helpers return 0.0 for empty input instead of NaN.

use ndarray::Array1;

pub fn mean(values: &[f64]) -> f64 {
    Array1::from(values.to_vec()).mean().unwrap_or(0.0)
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    Array1::from(values.to_vec()).std(0.0)
}

/// Nearest-rank percentile over an ascending slice: index = floor(n * p), clamped to n - 1
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut values = values.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}
