use serde::Serialize;
use std::path::PathBuf;

use histmatch_cli::load_store;
use histmatch_core::config::config_handle;
use histmatch_core::{nearest_k, HistogramStore, Metric};
use rand::Rng;

/// Which histogram to search with.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchQuery {
    /// The stored histogram of this image key
    Key(String),
    /// The stored histogram of a random image
    Random,
    /// An explicit histogram
    Histogram(Vec<f64>),
}

/// Search result for JSON output.
#[derive(Serialize)]
pub struct MatchReport {
    pub query: String,
    pub metric: Metric,
    pub matches: Vec<MatchEntry>,
}

/// One ranked match.
#[derive(Serialize)]
pub struct MatchEntry {
    pub rank: usize,
    pub path: String,
    pub image_path: String,
    pub distance: f64,
}

/// Resolve the query to a label and histogram.
fn resolve_query(store: &HistogramStore, query: MatchQuery) -> Result<(String, Vec<f64>), String> {
    if store.is_empty() {
        return Err("Dataset holds no images".to_string());
    }

    match query {
        MatchQuery::Key(key) => {
            let index = store
                .find(&key)
                .ok_or_else(|| format!("No image with key {} in the dataset", key))?;
            Ok((key, store.records()[index].histogram.clone()))
        }
        MatchQuery::Random => {
            let index = rand::thread_rng().gen_range(0..store.len());
            let record = &store.records()[index];
            Ok((record.path.clone(), record.histogram.clone()))
        }
        MatchQuery::Histogram(values) => {
            if values.len() != store.bin_count() {
                return Err(format!(
                    "Histogram has {} values but the dataset uses {} bins",
                    values.len(),
                    store.bin_count()
                ));
            }
            Ok(("<histogram>".to_string(), values))
        }
    }
}

/// Find the images whose histograms are closest to the query.
pub fn cmd_match(
    data: Option<PathBuf>,
    query: MatchQuery,
    metric: Option<Metric>,
    top: usize,
    json: bool,
) -> Result<(), String> {
    let config = &config_handle().config;
    let data_dir = data.unwrap_or_else(|| config.data_dir.clone());
    let metric = metric.unwrap_or(config.metric);

    let store = load_store(&data_dir)?;
    let (label, histogram) = resolve_query(&store, query)?;
    log::debug!("Searching {} images for {} ({})", store.len(), label, metric);

    let matches = nearest_k(&histogram, store.records(), metric, top);

    let report = MatchReport {
        query: label,
        metric,
        matches: matches
            .iter()
            .enumerate()
            .map(|(rank, m)| {
                let record = &store.records()[m.index];
                MatchEntry {
                    rank: rank + 1,
                    path: record.path.clone(),
                    image_path: record.image_path.clone(),
                    distance: m.distance,
                }
            })
            .collect(),
    };

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Failed to serialize results: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    if report.matches.is_empty() {
        // Only NaN distances, e.g. an all-zero histogram under Hellinger
        println!("No match for {} ({})", report.query, metric);
        return Ok(());
    }

    println!("Closest to {} ({}):", report.query, metric);
    for entry in &report.matches {
        println!("  {:>3}. {} ({:.4})", entry.rank, entry.path, entry.distance);
    }

    Ok(())
}
