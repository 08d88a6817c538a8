//! Data models for histmatch
//!
//! Per-image histogram records as stored in the chunk files, plus the
//! small value types shared by the editor, matcher and render layer.

use serde::{Deserialize, Serialize};

/// One image's histogram and metadata, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRecord {
    /// Unique key (path relative to the image root)
    pub path: String,

    /// Path of the image as recorded when the histogram was computed
    pub image_path: String,

    /// Source image dimensions
    pub image_shape: ImageShape,

    /// Histogram values (same length for every record in a store)
    pub histogram: Vec<f64>,

    /// Bin layout descriptor, if the chunk carried one
    pub bins: Option<BinSpec>,
}

impl HistogramRecord {
    /// Build a record from its chunk key and raw payload.
    pub fn from_raw(path: String, raw: RawRecord) -> Self {
        Self {
            path,
            image_path: raw.img_path,
            image_shape: raw.img_shape,
            histogram: raw.histogram,
            bins: raw.bins,
        }
    }

    /// Convert back to the on-disk payload shape.
    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            img_path: self.image_path.clone(),
            img_shape: self.image_shape,
            histogram: self.histogram.clone(),
            bins: self.bins.clone(),
        }
    }

    /// Largest histogram value (0.0 for an empty histogram)
    pub fn max_value(&self) -> f64 {
        self.histogram.iter().cloned().fold(0.0, f64::max)
    }
}

/// Record payload exactly as it appears in a chunk file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub img_path: String,
    pub img_shape: ImageShape,
    pub histogram: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<BinSpec>,
}

/// Image dimensions, serialized as `[height, width]` or `[height, width, channels]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct ImageShape {
    pub height: u32,
    pub width: u32,
    pub channels: Option<u32>,
}

impl ImageShape {
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            channels: None,
        }
    }

    pub fn with_channels(height: u32, width: u32, channels: u32) -> Self {
        Self {
            height,
            width,
            channels: Some(channels),
        }
    }
}

impl TryFrom<Vec<u32>> for ImageShape {
    type Error = String;

    fn try_from(dims: Vec<u32>) -> Result<Self, Self::Error> {
        match dims.as_slice() {
            [height, width] => Ok(Self::new(*height, *width)),
            [height, width, channels, ..] => Ok(Self::with_channels(*height, *width, *channels)),
            _ => Err(format!(
                "img_shape needs at least [height, width], got {} value(s)",
                dims.len()
            )),
        }
    }
}

impl From<ImageShape> for Vec<u32> {
    fn from(shape: ImageShape) -> Self {
        match shape.channels {
            Some(channels) => vec![shape.height, shape.width, channels],
            None => vec![shape.height, shape.width],
        }
    }
}

impl std::fmt::Display for ImageShape {
    /// Formats as `width×height`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Bin layout descriptor carried by each record.
///
/// The indexer writes the number of bins per channel; other producers
/// write an array of bin-boundary descriptors, which are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    PerChannel(u32),
    Descriptors(Vec<serde_json::Value>),
}

/// A pointer position in canvas-local pixels (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whole pixel columns available for display buckets
    pub fn pixel_columns(&self) -> usize {
        if self.width.is_finite() && self.width > 0.0 {
            self.width.floor() as usize
        } else {
            0
        }
    }
}
