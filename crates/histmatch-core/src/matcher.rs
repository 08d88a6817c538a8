//! Nearest-neighbor search over the histogram store.
//!
//! Every search is a full linear scan; nothing is cached between calls.
//! Ties keep the first record encountered, and records whose distance is
//! NaN or infinite never win. Large stores are scanned with rayon; the
//! reduction compares `(distance, index)` so the parallel result is the same
//! record the sequential scan would pick.

use rayon::prelude::*;

use crate::metrics::{distance, Metric};
use crate::models::HistogramRecord;

/// Record count above which the scan runs in parallel.
pub const PARALLEL_THRESHOLD: usize = 4096;

/// A record index and its distance to the query histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub index: usize,
    pub distance: f64,
}

impl Match {
    /// Whether `self` beats `other`: strictly smaller distance, or equal
    /// distance at an earlier index.
    fn beats(&self, other: &Match) -> bool {
        self.distance < other.distance
            || (self.distance == other.distance && self.index < other.index)
    }
}

fn better(a: Option<Match>, b: Option<Match>) -> Option<Match> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.beats(&a) { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

fn candidate(index: usize, distance: f64) -> Option<Match> {
    (distance < f64::INFINITY).then_some(Match { index, distance })
}

/// Closest record to `query` under `metric`, or `None` when no record has
/// a finite distance.
pub fn find_nearest(query: &[f64], records: &[HistogramRecord], metric: Metric) -> Option<Match> {
    if records.len() >= PARALLEL_THRESHOLD {
        records
            .par_iter()
            .enumerate()
            .map(|(index, record)| candidate(index, distance(metric, query, &record.histogram)))
            .reduce(|| None, better)
    } else {
        let mut best: Option<Match> = None;
        let mut min_distance = f64::INFINITY;
        for (index, record) in records.iter().enumerate() {
            let d = distance(metric, query, &record.histogram);
            if d < min_distance {
                min_distance = d;
                best = Some(Match { index, distance: d });
            }
        }
        best
    }
}

/// The `k` closest records ordered by distance, then index.
///
/// Records with a NaN distance are left out.
pub fn nearest_k(
    query: &[f64],
    records: &[HistogramRecord],
    metric: Metric,
    k: usize,
) -> Vec<Match> {
    let mut matches: Vec<Match> = records
        .par_iter()
        .enumerate()
        .map(|(index, record)| Match {
            index,
            distance: distance(metric, query, &record.histogram),
        })
        .filter(|m| !m.distance.is_nan())
        .collect();

    matches.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then(a.index.cmp(&b.index))
    });
    matches.truncate(k);
    matches
}
