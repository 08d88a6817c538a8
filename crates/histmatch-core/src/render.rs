//! Bar geometry for the histogram overlay.
//!
//! Both the working histogram and the matched image's original histogram
//! are drawn over the same display buckets the editor uses. A bar's height
//! is the average of `log10(v + LOG_EPSILON)` over the positive bins in its
//! bucket, mapped from `[LOG_MIN, LOG_MAX]` onto the canvas height. Buckets
//! with no positive bin sit at the floor.

use crate::editor::{DisplayBinning, LOG_EPSILON, LOG_MAX, LOG_MIN};
use crate::models::Canvas;

/// Straight RGBA color, 0-255 per channel.
pub type Rgba = [u8; 4];

/// Fill for the user-edited histogram (blue at half opacity).
pub const WORKING_COLOR: Rgba = [0, 0, 255, 128];
/// Fill for the matched image's original histogram (red at half opacity).
pub const ORIGINAL_COLOR: Rgba = [255, 0, 0, 128];

/// One bar in canvas pixels; it spans `top()..canvas height` vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub width: f64,
    pub height: f64,
}

impl Bar {
    /// Y coordinate of the bar's top edge on a canvas `canvas_height` tall.
    pub fn top(&self, canvas_height: f64) -> f64 {
        canvas_height - self.height
    }
}

/// Height in pixels for the bins of one bucket.
pub fn bar_height(values: &[f64], canvas_height: f64) -> f64 {
    let (log_sum, valid) = values
        .iter()
        .filter(|v| **v > 0.0)
        .fold((0.0, 0usize), |(sum, n), v| (sum + (v + LOG_EPSILON).log10(), n + 1));

    let avg_log = if valid > 0 {
        log_sum / valid as f64
    } else {
        LOG_MIN
    };

    let normalized = (avg_log - LOG_MIN) / (LOG_MAX - LOG_MIN);
    normalized * canvas_height
}

/// Bars for every display bucket of `histogram`.
pub fn histogram_bars(histogram: &[f64], binning: &DisplayBinning, canvas_height: f64) -> Vec<Bar> {
    let width = binning.bucket_width();
    (0..binning.display_bins())
        .map(|bucket| Bar {
            x: bucket as f64 * width,
            width,
            height: bar_height(&histogram[binning.bucket_range(bucket)], canvas_height),
        })
        .collect()
}

/// One drawable series.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub color: Rgba,
    pub bars: Vec<Bar>,
}

/// Working and original histograms ready to paint, working series first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramOverlay {
    pub canvas: Canvas,
    pub working: BarSeries,
    pub original: BarSeries,
}

impl HistogramOverlay {
    pub fn new(working: &[f64], original: &[f64], canvas: Canvas) -> Self {
        let binning = DisplayBinning::new(working.len(), canvas);
        Self {
            canvas,
            working: BarSeries {
                color: WORKING_COLOR,
                bars: histogram_bars(working, &binning, canvas.height),
            },
            original: BarSeries {
                color: ORIGINAL_COLOR,
                bars: histogram_bars(original, &binning, canvas.height),
            },
        }
    }

    /// Series in paint order.
    pub fn series(&self) -> [&BarSeries; 2] {
        [&self.working, &self.original]
    }
}
