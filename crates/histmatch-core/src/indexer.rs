//! Histogram indexer
//!
//! Builds the chunk files the store loads: every image under a folder gets a
//! 3D color histogram with `n` bins per channel, flattened in B, G, R order
//! (`b * n * n + g * n + r`) and normalized to sum to 1. Records are keyed by
//! the image path relative to the folder and written `chunk_size` at a time.

use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::models::{BinSpec, ImageShape, RawRecord};
use crate::store::{chunk_file_name, MAX_CHUNKS};

/// Image extensions picked up when scanning a folder
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Errors that can occur while building an index.
#[derive(Debug)]
pub enum IndexError {
    /// A file or directory could not be read or written
    Io { path: String, message: String },
    /// An image could not be decoded
    Decode { path: String, message: String },
    /// Chunk serialization failed
    Serialize(String),
    /// Indexing options out of range
    InvalidOptions(String),
    /// The folder holds no supported images
    NoImages(String),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::Io { path, message } => write!(f, "I/O error on {}: {}", path, message),
            IndexError::Decode { path, message } => {
                write!(f, "Failed to decode {}: {}", path, message)
            }
            IndexError::Serialize(e) => write!(f, "Failed to serialize chunk: {}", e),
            IndexError::InvalidOptions(e) => write!(f, "Invalid index options: {}", e),
            IndexError::NoImages(dir) => write!(
                f,
                "No supported images found in {} (supported: {})",
                dir,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        }
    }
}

impl std::error::Error for IndexError {}

fn io_error(path: &Path, err: std::io::Error) -> IndexError {
    IndexError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Indexing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Bins per color channel
    pub bins_per_channel: u32,
    /// Records per chunk file
    pub chunk_size: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            bins_per_channel: 8,
            chunk_size: 1000,
        }
    }
}

impl IndexOptions {
    fn validate(&self) -> Result<(), IndexError> {
        if !(1..=256).contains(&self.bins_per_channel) {
            return Err(IndexError::InvalidOptions(format!(
                "bins per channel must be between 1 and 256, got {}",
                self.bins_per_channel
            )));
        }
        if self.chunk_size == 0 {
            return Err(IndexError::InvalidOptions(
                "chunk size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counts from one indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexSummary {
    pub images_found: usize,
    pub indexed: usize,
    pub skipped: usize,
    pub chunks: usize,
}

/// Whether `path` has one of the supported extensions (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Every supported image below `dir`, recursively, in sorted order.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, IndexError> {
    let mut files = Vec::new();
    collect_images_into(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_images_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IndexError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    for entry in entries {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_dir() {
            collect_images_into(&path, files)?;
        } else if path.is_file() && is_supported_image(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Record key for `path`: relative to `root`, `/`-separated.
pub fn record_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalized 3D color histogram of `img`, flattened as `b*n*n + g*n + r`.
///
/// Channel values are split into `bins` equal-width ranges over `0..256`.
/// An image with no pixels yields all zeros.
pub fn compute_bgr_histogram(img: &image::RgbImage, bins: u32) -> Vec<f64> {
    let n = bins as usize;
    let mut counts = vec![0u64; n * n * n];
    let bin_of = |v: u8| v as usize * n / 256;

    for pixel in img.pixels() {
        let [r, g, b] = pixel.0;
        counts[bin_of(b) * n * n + bin_of(g) * n + bin_of(r)] += 1;
    }

    let total: u64 = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    counts
        .into_iter()
        .map(|c| c as f64 / total as f64)
        .collect()
}

/// Decode `path` and build its chunk record.
pub fn index_image(path: &Path, bins: u32) -> Result<RawRecord, IndexError> {
    let img = image::open(path)
        .map_err(|e| IndexError::Decode {
            path: path.display().to_string(),
            message: e.to_string(),
        })?
        .to_rgb8();

    Ok(RawRecord {
        img_path: path.display().to_string(),
        img_shape: ImageShape::with_channels(img.height(), img.width(), 3),
        histogram: compute_bgr_histogram(&img, bins),
        bins: Some(BinSpec::PerChannel(bins)),
    })
}

/// Index `images` in parallel, keeping their order.
///
/// Images that fail to decode are logged and left out.
pub fn build_records(root: &Path, images: &[PathBuf], bins: u32) -> Vec<(String, RawRecord)> {
    images
        .par_iter()
        .filter_map(|path| match index_image(path, bins) {
            Ok(record) => Some((record_key(root, path), record)),
            Err(e) => {
                log::warn!("Skipping image: {}", e);
                None
            }
        })
        .collect()
}

/// Write `records` to `out_dir` as consecutive chunk files.
///
/// Chunk files left in `out_dir` by an earlier, larger index are removed so
/// the store does not pick them up. Returns the number of chunk files
/// written.
pub fn write_chunks(
    out_dir: &Path,
    records: &[(String, RawRecord)],
    chunk_size: usize,
) -> Result<usize, IndexError> {
    if chunk_size == 0 {
        return Err(IndexError::InvalidOptions(
            "chunk size must be at least 1".to_string(),
        ));
    }
    std::fs::create_dir_all(out_dir).map_err(|e| io_error(out_dir, e))?;

    let mut written = 0;
    for (index, chunk) in records.chunks(chunk_size).enumerate() {
        let map: IndexMap<&str, &RawRecord> =
            chunk.iter().map(|(key, raw)| (key.as_str(), raw)).collect();
        let json =
            serde_json::to_string(&map).map_err(|e| IndexError::Serialize(e.to_string()))?;

        let path = out_dir.join(chunk_file_name(index));
        std::fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        log::debug!("Wrote {} ({} records)", path.display(), chunk.len());
        written += 1;
    }

    remove_stale_chunks(out_dir, written)?;
    Ok(written)
}

/// Delete the consecutive chunk files starting at `first`.
fn remove_stale_chunks(out_dir: &Path, first: usize) -> Result<(), IndexError> {
    for index in first..MAX_CHUNKS {
        let path = out_dir.join(chunk_file_name(index));
        if !path.is_file() {
            break;
        }
        std::fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
        log::info!("Removed stale chunk {}", path.display());
    }
    Ok(())
}

/// Index every supported image under `images_dir` into `out_dir`.
pub fn build_index(
    images_dir: &Path,
    out_dir: &Path,
    options: IndexOptions,
) -> Result<IndexSummary, IndexError> {
    options.validate()?;

    let images = collect_images(images_dir)?;
    if images.is_empty() {
        return Err(IndexError::NoImages(images_dir.display().to_string()));
    }
    log::info!("Found {} image(s) in {}", images.len(), images_dir.display());

    let records = build_records(images_dir, &images, options.bins_per_channel);
    let chunks = write_chunks(out_dir, &records, options.chunk_size)?;

    let summary = IndexSummary {
        images_found: images.len(),
        indexed: records.len(),
        skipped: images.len() - records.len(),
        chunks,
    };
    log::info!(
        "Indexed {} image(s) into {} chunk(s), {} skipped",
        summary.indexed,
        summary.chunks,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests;
