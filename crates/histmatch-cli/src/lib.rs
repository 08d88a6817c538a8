//! Shared utilities for histmatch-cli
//!
//! Argument parsers plus the small helpers the commands share for logging
//! setup and loading a dataset.

pub mod parsers;

use std::path::Path;

use histmatch_core::{DirChunkSource, HistogramStore};

pub use parsers::{parse_histogram, parse_metric, parse_positive};

/// Install the global logger. `verbose` raises the default filter to
/// `debug`; `RUST_LOG` still overrides it.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Load every chunk under `data_dir`.
pub fn load_store(data_dir: &Path) -> Result<HistogramStore, String> {
    if !data_dir.is_dir() {
        return Err(format!("Data directory not found: {}", data_dir.display()));
    }
    HistogramStore::load(DirChunkSource::new(data_dir))
        .map_err(|e| format!("{} in {}", e, data_dir.display()))
}
