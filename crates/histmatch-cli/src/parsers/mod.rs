//! Parsing functions for CLI arguments.

use histmatch_core::Metric;

/// Parse a metric name (`hellinger` or `l2`, case-insensitive).
pub fn parse_metric(s: &str) -> Result<Metric, String> {
    s.parse::<Metric>().map_err(|e| e.to_string())
}

/// Parse a histogram given as comma-separated values, e.g. `0.5,0.25,0.25`.
///
/// Every value must be a finite, non-negative number.
pub fn parse_histogram(s: &str) -> Result<Vec<f64>, String> {
    let values = s
        .split(',')
        .enumerate()
        .map(|(i, part)| {
            let v = part
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid histogram value at position {}: {}", i, part))?;
            if !v.is_finite() || v < 0.0 {
                return Err(format!(
                    "Histogram value at position {} must be finite and non-negative, got {}",
                    i, v
                ));
            }
            Ok(v)
        })
        .collect::<Result<Vec<f64>, String>>()?;

    Ok(values)
}

/// Parse a positive count such as `--top` or `--chunk-size`.
pub fn parse_positive(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("Value must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("Invalid number: {}", s)),
    }
}
