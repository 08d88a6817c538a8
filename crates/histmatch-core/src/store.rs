//! Histogram store and chunked loading.
//!
//! Histogram data is split over numbered chunk files (`chunk_0000.json`,
//! `chunk_0001.json`, ...). Each chunk is a JSON object mapping an image key
//! to its record payload. Loading happens in two phases:
//!
//! 1. Discovery: probe chunk indices from 0 until one is missing.
//! 2. Load: fetch and parse each discovered chunk. A chunk that cannot be
//!    read or parsed is logged and skipped; the rest still load.
//!
//! [`ChunkLoader`] performs phase 2 one chunk per iteration step and yields
//! a [`LoadEvent`] with running progress, so a UI can drive it from a worker
//! thread and stay responsive.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

use crate::models::{HistogramRecord, RawRecord};

/// Chunk indices are four zero-padded digits, so at most 10 000 chunks.
pub const MAX_CHUNKS: usize = 10_000;

/// File name of the chunk at `index`.
pub fn chunk_file_name(index: usize) -> String {
    format!("chunk_{:04}.json", index)
}

/// Errors that can occur while loading histogram data.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// No chunk could be discovered at all
    NoData,
    /// A chunk could not be read
    Io { path: String, message: String },
    /// A chunk was not valid chunk JSON
    Parse { chunk: String, message: String },
    /// Chunk content violated a store invariant
    Invalid(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NoData => write!(f, "No data files found"),
            LoadError::Io { path, message } => write!(f, "Failed to read {}: {}", path, message),
            LoadError::Parse { chunk, message } => {
                write!(f, "Failed to parse {}: {}", chunk, message)
            }
            LoadError::Invalid(e) => write!(f, "Invalid histogram data: {}", e),
        }
    }
}

impl std::error::Error for LoadError {}

/// Where chunk text comes from.
pub trait ChunkSource {
    /// Whether chunk `index` exists.
    fn probe(&self, index: usize) -> bool;

    /// Read the full text of chunk `index`.
    fn fetch(&self, index: usize) -> Result<String, LoadError>;
}

impl<S: ChunkSource + ?Sized> ChunkSource for &S {
    fn probe(&self, index: usize) -> bool {
        (**self).probe(index)
    }

    fn fetch(&self, index: usize) -> Result<String, LoadError> {
        (**self).fetch(index)
    }
}

/// Chunk files in a directory on disk.
#[derive(Debug, Clone)]
pub struct DirChunkSource {
    dir: PathBuf,
}

impl DirChunkSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.dir.join(chunk_file_name(index))
    }
}

impl ChunkSource for DirChunkSource {
    fn probe(&self, index: usize) -> bool {
        self.chunk_path(index).is_file()
    }

    fn fetch(&self, index: usize) -> Result<String, LoadError> {
        let path = self.chunk_path(index);
        std::fs::read_to_string(&path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Count consecutive chunks starting at index 0.
///
/// Stops at the first missing chunk or at [`MAX_CHUNKS`].
pub fn probe_chunk_count<S: ChunkSource + ?Sized>(source: &S) -> usize {
    let mut count = 0;
    while count < MAX_CHUNKS && source.probe(count) {
        count += 1;
    }
    count
}

/// Parse one chunk's JSON text into records, keeping the file's key order.
///
/// `expected_len` is the histogram length already established by earlier
/// chunks; when `None`, the first record of this chunk sets it. The chunk is
/// rejected as a whole if any histogram is empty, holds a negative or
/// non-finite value, or has a different length.
pub fn parse_chunk(
    index: usize,
    text: &str,
    expected_len: Option<usize>,
) -> Result<Vec<HistogramRecord>, LoadError> {
    let chunk: IndexMap<String, RawRecord> =
        serde_json::from_str(text).map_err(|e| LoadError::Parse {
            chunk: chunk_file_name(index),
            message: e.to_string(),
        })?;

    let mut expected_len = expected_len;
    let mut records = Vec::with_capacity(chunk.len());

    for (path, raw) in chunk {
        validate_histogram(&path, &raw.histogram, expected_len)?;
        expected_len.get_or_insert(raw.histogram.len());
        records.push(HistogramRecord::from_raw(path, raw));
    }

    Ok(records)
}

fn validate_histogram(
    path: &str,
    histogram: &[f64],
    expected_len: Option<usize>,
) -> Result<(), LoadError> {
    if histogram.is_empty() {
        return Err(LoadError::Invalid(format!("{}: empty histogram", path)));
    }
    if let Some(expected) = expected_len {
        if histogram.len() != expected {
            return Err(LoadError::Invalid(format!(
                "{}: histogram has {} bins, expected {}",
                path,
                histogram.len(),
                expected
            )));
        }
    }
    if let Some(bad) = histogram.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(LoadError::Invalid(format!(
            "{}: histogram value {} is not a finite non-negative number",
            path, bad
        )));
    }
    Ok(())
}

/// Running load progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub loaded_chunks: usize,
    pub total_chunks: usize,
    pub image_count: usize,
}

impl LoadProgress {
    /// Rounded percentage of discovered chunks loaded so far
    pub fn percent(&self) -> u32 {
        if self.total_chunks == 0 {
            return 0;
        }
        ((self.loaded_chunks as f64 / self.total_chunks as f64) * 100.0).round() as u32
    }
}

impl std::fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} of {} chunks ({} images)",
            self.loaded_chunks, self.total_chunks, self.image_count
        )
    }
}

/// Outcome of one loader step.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    /// The chunk was parsed and its records appended
    Loaded {
        index: usize,
        records: usize,
        progress: LoadProgress,
    },
    /// The chunk was skipped
    Skipped {
        index: usize,
        reason: LoadError,
        progress: LoadProgress,
    },
}

impl LoadEvent {
    pub fn progress(&self) -> LoadProgress {
        match self {
            LoadEvent::Loaded { progress, .. } | LoadEvent::Skipped { progress, .. } => *progress,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            LoadEvent::Loaded { index, .. } | LoadEvent::Skipped { index, .. } => *index,
        }
    }
}

/// Incremental chunk loader; one chunk per `next()`.
pub struct ChunkLoader<S> {
    source: S,
    next_index: usize,
    total_chunks: usize,
    loaded_chunks: usize,
    records: Vec<HistogramRecord>,
    bin_count: Option<usize>,
    global_max: f64,
}

impl<S: ChunkSource> ChunkLoader<S> {
    /// Discover the chunk count, then prepare to load.
    pub fn new(source: S) -> Self {
        let total = probe_chunk_count(&source);
        log::debug!("Discovered {} chunk(s)", total);
        Self::with_total(source, total)
    }

    /// Prepare to load chunks `0..total_chunks` without probing.
    pub fn with_total(source: S, total_chunks: usize) -> Self {
        Self {
            source,
            next_index: 0,
            total_chunks,
            loaded_chunks: 0,
            records: Vec::new(),
            bin_count: None,
            global_max: 0.0,
        }
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            loaded_chunks: self.loaded_chunks,
            total_chunks: self.total_chunks,
            image_count: self.records.len(),
        }
    }

    /// Load any remaining chunks and build the store.
    pub fn finish(mut self) -> Result<HistogramStore, LoadError> {
        for _ in &mut self {}

        if self.total_chunks == 0 {
            return Err(LoadError::NoData);
        }

        log::info!("Global histogram max: {}", self.global_max);

        Ok(HistogramStore {
            records: self.records,
            bin_count: self.bin_count,
            global_max: self.global_max,
            loaded_chunks: self.loaded_chunks,
            total_chunks: self.total_chunks,
        })
    }

    fn load_chunk(&mut self, index: usize) -> Result<usize, LoadError> {
        let text = self.source.fetch(index)?;
        let records = parse_chunk(index, &text, self.bin_count)?;

        for record in &records {
            self.global_max = self.global_max.max(record.max_value());
        }
        if self.bin_count.is_none() {
            self.bin_count = records.first().map(|r| r.histogram.len());
        }

        let count = records.len();
        self.records.extend(records);
        self.loaded_chunks += 1;
        Ok(count)
    }
}

impl<S: ChunkSource> Iterator for ChunkLoader<S> {
    type Item = LoadEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.total_chunks {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;

        match self.load_chunk(index) {
            Ok(records) => {
                log::debug!("Loaded {} ({} records)", chunk_file_name(index), records);
                Some(LoadEvent::Loaded {
                    index,
                    records,
                    progress: self.progress(),
                })
            }
            Err(reason) => {
                log::warn!("Error loading chunk {}: {}", index, reason);
                Some(LoadEvent::Skipped {
                    index,
                    reason,
                    progress: self.progress(),
                })
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_chunks - self.next_index;
        (remaining, Some(remaining))
    }
}

/// All loaded histogram records plus dataset-wide statistics.
#[derive(Debug, Clone)]
pub struct HistogramStore {
    records: Vec<HistogramRecord>,
    bin_count: Option<usize>,
    global_max: f64,
    loaded_chunks: usize,
    total_chunks: usize,
}

impl HistogramStore {
    /// Discover and load every chunk from `source`.
    pub fn load<S: ChunkSource>(source: S) -> Result<Self, LoadError> {
        ChunkLoader::new(source).finish()
    }

    /// Build a store from records already in memory.
    pub fn from_records(records: Vec<HistogramRecord>) -> Result<Self, LoadError> {
        let mut bin_count = None;
        let mut global_max: f64 = 0.0;
        for record in &records {
            validate_histogram(&record.path, &record.histogram, bin_count)?;
            bin_count.get_or_insert(record.histogram.len());
            global_max = global_max.max(record.max_value());
        }

        Ok(Self {
            records,
            bin_count,
            global_max,
            loaded_chunks: 0,
            total_chunks: 0,
        })
    }

    pub fn records(&self) -> &[HistogramRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&HistogramRecord> {
        self.records.get(index)
    }

    /// Index of the record with key `path`.
    pub fn find(&self, path: &str) -> Option<usize> {
        self.records.iter().position(|r| r.path == path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Histogram length shared by every record (0 when empty)
    pub fn bin_count(&self) -> usize {
        self.bin_count.unwrap_or(0)
    }

    /// Largest value across all histograms
    pub fn global_max(&self) -> f64 {
        self.global_max
    }

    pub fn loaded_chunks(&self) -> usize {
        self.loaded_chunks
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    /// Image file for the record at `index`, under `image_root`.
    pub fn image_path(&self, image_root: &Path, index: usize) -> Option<PathBuf> {
        self.get(index).map(|r| image_root.join(&r.path))
    }
}
