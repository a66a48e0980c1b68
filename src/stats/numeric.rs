//! Summary statistics over per-match values
//!
//! Every function here returns `None` for an empty input rather than NaN.

use serde::{Deserialize, Serialize};

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(sum(values) / values.len() as f64)
    }
}

/// Median of the values, averaging the two central elements for even lengths
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let upper = sorted[n / 2];
    let lower = sorted[(n + 1) / 2 - 1];
    Some((upper + lower) / 2.0)
}

/// Population variance
pub fn variance(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let squared: f64 = values.iter().map(|v| (v - mu).powi(2)).sum();
    Some(squared / values.len() as f64)
}

/// Population standard deviation
pub fn stdev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// `count / total`, or `None` when nothing was counted against
pub fn rate(count: usize, total: usize) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(count as f64 / total as f64)
    }
}

/// Distribution of one per-match sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Distribution {
    pub sum: f64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub variance: Option<f64>,
    pub stdev: Option<f64>,
}

impl Distribution {
    pub fn of(values: &[f64]) -> Self {
        Distribution {
            sum: sum(values),
            mean: mean(values),
            median: median(values),
            variance: variance(values),
            stdev: stdev(values),
        }
    }
}
