//! Histogram distance metrics.
//!
//! Pure functions over two equal-length sequences of non-negative values.
//! Neither function special-cases degenerate input: a histogram summing to
//! zero makes the Hellinger distance NaN, and that NaN is passed through
//! to callers unchanged.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Selectable distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Hellinger distance between the sum-normalized histograms
    #[default]
    Hellinger,
    /// Euclidean distance between the raw histograms
    L2,
}

impl Metric {
    /// All metrics, in menu order
    pub fn all() -> &'static [Metric] {
        &[Metric::Hellinger, Metric::L2]
    }

    /// Lower-case identifier used on the command line and in config files
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Hellinger => "hellinger",
            Metric::L2 => "l2",
        }
    }

    /// Upper-case label used in distance captions
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Hellinger => "HELLINGER",
            Metric::L2 => "L2",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when selecting a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    /// The name did not match any known metric
    Unknown(String),
}

impl std::fmt::Display for MetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricError::Unknown(name) => write!(
                f,
                "Unknown metric: {} (expected one of: hellinger, l2)",
                name
            ),
        }
    }
}

impl std::error::Error for MetricError {}

impl FromStr for Metric {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hellinger" => Ok(Metric::Hellinger),
            "l2" => Ok(Metric::L2),
            _ => Err(MetricError::Unknown(s.to_string())),
        }
    }
}

/// Hellinger distance between two histograms.
///
/// Each input is normalized to a probability mass function by its own sum,
/// then `sqrt(sum((sqrt(p) - sqrt(q))^2)) / sqrt(2)`. The result lies in
/// [0, 1] for valid input and is NaN when either histogram sums to zero.
pub fn hellinger_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "histogram lengths differ");

    let sum_a: f64 = a.iter().sum();
    let sum_b: f64 = b.iter().sum();

    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let diff = (x / sum_a).sqrt() - (y / sum_b).sqrt();
            diff * diff
        })
        .sum();

    sum.sqrt() / std::f64::consts::SQRT_2
}

/// Euclidean (L2) distance between two raw histograms.
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len(), "histogram lengths differ");

    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Distance between two histograms under the given metric.
#[inline]
pub fn distance(metric: Metric, a: &[f64], b: &[f64]) -> f64 {
    match metric {
        Metric::Hellinger => hellinger_distance(a, b),
        Metric::L2 => l2_distance(a, b),
    }
}
