//! Viewer configuration management.
//!
//! Settings come from the first readable YAML file among the candidate
//! locations; anything missing falls back to the built-in defaults and every
//! value is sanitized after parsing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use serde::{Deserialize, Serialize};

use crate::indexer::IndexOptions;
use crate::metrics::Metric;

/// Environment variable naming a config file to use.
pub const CONFIG_ENV_VAR: &str = "HISTMATCH_CONFIG";

/// Candidate config file names searched for on disk.
const CONFIG_FILENAMES: &[&str] = &["histmatch.yml", "histmatch.yaml"];

/// Loaded configuration, where it came from, and anything odd found on the way.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    pub config: ViewerConfig,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl ConfigHandle {
    fn with_config(config: ViewerConfig, source: Option<PathBuf>, warnings: Vec<String>) -> Self {
        Self {
            config,
            source,
            warnings,
        }
    }
}

/// Complete configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory holding `chunk_NNNN.json` files
    pub data_dir: PathBuf,
    /// Directory image keys are resolved against
    pub image_root: PathBuf,
    /// Metric selected at startup
    pub metric: Metric,
    /// Records per chunk when indexing
    pub chunk_size: usize,
    /// Histogram bins per color channel when indexing
    pub bins_per_channel: u32,
    /// Longest edge of the image preview texture, in pixels
    pub preview_max_dimension: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("histogram_chunks"),
            image_root: PathBuf::from("wikiart"),
            metric: Metric::Hellinger,
            chunk_size: 1000,
            bins_per_channel: 8,
            preview_max_dimension: 1024,
        }
    }
}

impl ViewerConfig {
    /// Parse and sanitize YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<ViewerConfig>(contents).map(Self::sanitize)
    }

    pub(crate) fn sanitize(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        self.bins_per_channel = self.bins_per_channel.clamp(1, 256);
        self.preview_max_dimension = self.preview_max_dimension.clamp(64, 8192);
        self
    }

    /// Indexer settings taken from this config.
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            bins_per_channel: self.bins_per_channel,
            chunk_size: self.chunk_size,
        }
    }
}

/// Load configuration from disk, optionally forcing a specific path first.
pub fn load_config(custom_path: Option<&Path>) -> ConfigHandle {
    let mut warnings = Vec::new();

    for candidate in get_config_candidates(custom_path) {
        if !candidate.is_file() {
            continue;
        }

        match fs::read_to_string(&candidate) {
            Ok(contents) => match ViewerConfig::from_yaml_str(&contents) {
                Ok(config) => {
                    let source = fs::canonicalize(&candidate).unwrap_or(candidate);
                    return ConfigHandle::with_config(config, Some(source), warnings);
                }
                Err(err) => warnings.push(format!(
                    "Failed to parse config {}: {}",
                    candidate.display(),
                    err
                )),
            },
            Err(err) => warnings.push(format!(
                "Failed to read config {}: {}",
                candidate.display(),
                err
            )),
        }
    }

    warnings.push("No config found; using built-in defaults.".to_string());
    ConfigHandle::with_config(ViewerConfig::default(), None, warnings)
}

/// Get list of config file candidates to try
fn get_config_candidates(custom_path: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = custom_path {
        candidates.push(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        candidates.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(cwd.join("config").join(name));
            candidates.push(cwd.join(name));
        }
    }

    if let Some(home_dir) = dirs::home_dir() {
        for name in CONFIG_FILENAMES {
            candidates.push(home_dir.join("histmatch").join(name));
        }
    }

    candidates
}

static CONFIG_HANDLE: OnceLock<ConfigHandle> = OnceLock::new();
static LOG_CONFIG_ONCE: Once = Once::new();

/// Load the process-wide configuration, honoring `custom_path` if this is
/// the first call.
pub fn init_config(custom_path: Option<&Path>) -> &'static ConfigHandle {
    CONFIG_HANDLE.get_or_init(|| load_config(custom_path))
}

/// Access the global configuration (loaded once per process).
pub fn config_handle() -> &'static ConfigHandle {
    init_config(None)
}

/// Log the config source and warnings the first time it is requested.
pub fn log_config_usage() {
    LOG_CONFIG_ONCE.call_once(|| {
        let handle = config_handle();
        match &handle.source {
            Some(source) => log::debug!("Loaded config from {}", source.display()),
            None => log::debug!("Using built-in config defaults"),
        }

        for warning in &handle.warnings {
            log::warn!("Config warning: {}", warning);
        }
    });
}
