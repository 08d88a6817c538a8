//! Histmatch Core Library
//!
//! Color-histogram store, distance metrics, log-scale histogram editing and
//! nearest-image search for browsing an art dataset by color distribution.

pub mod config;
pub mod editor;
pub mod indexer;
pub mod matcher;
pub mod metrics;
pub mod models;
pub mod render;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use editor::{DisplayBinning, DragState, HistogramEditor};
pub use matcher::{find_nearest, nearest_k, Match};
pub use metrics::{distance, hellinger_distance, l2_distance, Metric, MetricError};
pub use models::{Canvas, HistogramRecord, ImageShape, Point};
pub use render::{Bar, BarSeries, HistogramOverlay};
pub use session::{MatchOutcome, ViewerSession};
pub use store::{
    ChunkLoader, ChunkSource, DirChunkSource, HistogramStore, LoadError, LoadEvent, LoadProgress,
};
