//! Interactive histogram editor.
//!
//! Pointer input on the drawing surface is translated into bin edits of a
//! working copy of the selected histogram. Heights map to values on a log
//! scale spanning `[log10(LOG_EPSILON), 0]`, so the top of the surface is
//! 1.0 and the bottom is (almost) zero.
//!
//! When the histogram has more bins than the surface has pixel columns,
//! contiguous bins are grouped into display buckets (see [`DisplayBinning`]).
//! A point edit writes one bucket and then resamples every bin from the
//! bucket representatives; a drag edit interpolates between the two pointer
//! positions bucket by bucket without that resampling pass.

use crate::models::{Canvas, Point};

/// Floor added before taking logarithms.
pub const LOG_EPSILON: f64 = 1e-9;
/// Bottom of the log scale (`log10(LOG_EPSILON)`).
pub const LOG_MIN: f64 = -9.0;
/// Top of the log scale (`log10(1.0)`).
pub const LOG_MAX: f64 = 0.0;

/// Linear histogram value for a vertical pointer position.
///
/// `y` is measured from the top of a surface `height` pixels tall. The
/// result is not clamped.
pub fn value_at_height(y: f64, height: f64) -> f64 {
    let normalized_y = 1.0 - y / height;
    let log_value = LOG_MIN + normalized_y * (LOG_MAX - LOG_MIN);
    10f64.powf(log_value) - LOG_EPSILON
}

/// Mapping between histogram bins and display buckets.
///
/// Bucket `i` of `D` covers bins `[floor(i*B/D), floor((i+1)*B/D))`, with
/// `D = min(B, canvas pixel columns)`. Every bin belongs to exactly one
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBinning {
    bin_count: usize,
    display_bins: usize,
    canvas_width: f64,
}

impl DisplayBinning {
    pub fn new(bin_count: usize, canvas: Canvas) -> Self {
        Self {
            bin_count,
            display_bins: bin_count.min(canvas.pixel_columns()),
            canvas_width: canvas.width,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn display_bins(&self) -> usize {
        self.display_bins
    }

    /// Width of one bucket in pixels
    pub fn bucket_width(&self) -> f64 {
        self.canvas_width / self.display_bins as f64
    }

    /// Whether several bins share a bucket
    pub fn is_collapsed(&self) -> bool {
        self.bin_count > self.display_bins
    }

    /// Bins covered by bucket `bucket`.
    pub fn bucket_range(&self, bucket: usize) -> std::ops::Range<usize> {
        if bucket >= self.display_bins {
            return self.bin_count..self.bin_count;
        }
        let start = bucket * self.bin_count / self.display_bins;
        let end = (bucket + 1) * self.bin_count / self.display_bins;
        start..end
    }

    /// Bucket column under horizontal position `x`; may lie outside
    /// `0..display_bins` when the pointer is past an edge.
    pub fn bucket_index(&self, x: f64) -> i64 {
        (x / self.bucket_width()).floor() as i64
    }

    /// Bucket under `x`, if it is on the surface.
    pub fn bucket_at(&self, x: f64) -> Option<usize> {
        let index = self.bucket_index(x);
        (0..self.display_bins as i64)
            .contains(&index)
            .then_some(index as usize)
    }

    /// Bucket containing bin `bin`.
    pub fn bucket_of_bin(&self, bin: usize) -> Option<usize> {
        if bin >= self.bin_count || self.display_bins == 0 {
            return None;
        }
        // Smallest i with floor((i+1)*B/D) > bin
        Some(((bin + 1) * self.display_bins - 1) / self.bin_count)
    }
}

/// Drag state of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Last pointer position applied
        last: Point,
    },
}

/// Working histogram plus drag state.
#[derive(Debug, Clone)]
pub struct HistogramEditor {
    working: Vec<f64>,
    global_max: f64,
    state: DragState,
}

impl HistogramEditor {
    /// Start editing a copy of `original`, clamping edits to `[0, global_max]`.
    pub fn new(original: &[f64], global_max: f64) -> Self {
        Self {
            working: original.to_vec(),
            global_max,
            state: DragState::Idle,
        }
    }

    pub fn working(&self) -> &[f64] {
        &self.working
    }

    pub fn global_max(&self) -> f64 {
        self.global_max
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Replace the working histogram with an exact copy of `original`.
    pub fn reset(&mut self, original: &[f64]) {
        self.working.clear();
        self.working.extend_from_slice(original);
    }

    /// Begin a drag and edit the bucket under `pos`.
    pub fn pointer_down(&mut self, pos: Point, canvas: Canvas) {
        self.state = DragState::Dragging { last: pos };
        self.apply_point(pos, canvas);
    }

    /// Continue a drag: fill the path from the last position, then edit
    /// the bucket under `pos`. Ignored when not dragging.
    pub fn pointer_move(&mut self, pos: Point, canvas: Canvas) {
        let DragState::Dragging { last } = self.state else {
            return;
        };
        self.apply_drag(last, pos, canvas);
        self.state = DragState::Dragging { last: pos };
        self.apply_point(pos, canvas);
    }

    /// End the drag. Returns whether a drag was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }

    /// The pointer left the surface; same as releasing it.
    pub fn pointer_leave(&mut self) -> bool {
        self.pointer_up()
    }

    fn clamp(&self, value: f64) -> f64 {
        value.max(0.0).min(self.global_max)
    }

    fn fill_bucket(&mut self, binning: &DisplayBinning, bucket: usize, value: f64) {
        let range = binning.bucket_range(bucket);
        self.working[range].fill(value);
    }

    /// Set the bucket under `pos` to the height-derived value.
    ///
    /// When buckets collapse several bins, every bin is then resampled
    /// from the bucket representatives.
    pub fn apply_point(&mut self, pos: Point, canvas: Canvas) {
        let binning = DisplayBinning::new(self.working.len(), canvas);
        if binning.display_bins() == 0 {
            return;
        }

        let value = self.clamp(value_at_height(pos.y, canvas.height));
        if let Some(bucket) = binning.bucket_at(pos.x) {
            self.fill_bucket(&binning, bucket, value);
        }

        if binning.is_collapsed() {
            self.resample(&binning);
        }
    }

    /// Interpolate values along the drag path from `from` to `to`.
    ///
    /// Every bucket between the two endpoint buckets (inclusive) gets the
    /// value linearly interpolated between the endpoint values. The ramp
    /// always runs left to right: the leftmost bucket takes the value at
    /// `from`, the rightmost the value at `to`, whichever way the pointer
    /// moved. Returns false when both endpoints fall in the same bucket.
    pub fn apply_drag(&mut self, from: Point, to: Point, canvas: Canvas) -> bool {
        let binning = DisplayBinning::new(self.working.len(), canvas);
        if binning.display_bins() == 0 {
            return false;
        }

        let start_bucket = binning.bucket_index(from.x);
        let end_bucket = binning.bucket_index(to.x);
        if start_bucket == end_bucket {
            return false;
        }

        let start_value = value_at_height(from.y, canvas.height);
        let end_value = value_at_height(to.y, canvas.height);
        let min_bucket = start_bucket.min(end_bucket);
        let max_bucket = start_bucket.max(end_bucket);
        let span = (max_bucket - min_bucket) as f64;

        let last_bucket = binning.display_bins() as i64 - 1;
        let lo = min_bucket.max(0);
        let hi = max_bucket.min(last_bucket);

        for bucket in lo..=hi {
            let ratio = (bucket - min_bucket) as f64 / span;
            let value = self.clamp(start_value + (end_value - start_value) * ratio);
            self.fill_bucket(&binning, bucket as usize, value);
        }

        true
    }

    /// Piecewise-linear resample of every bin from the bucket representatives.
    ///
    /// Bucket `i` is represented by its first bin, anchored at
    /// `(i + 0.5) / D`; bin `j` sits at `j / B`. Positions outside the
    /// first and last anchor take the nearest anchor's value.
    fn resample(&mut self, binning: &DisplayBinning) {
        let display_bins = binning.display_bins();
        let anchors: Vec<(f64, f64)> = (0..display_bins)
            .map(|i| {
                let pos = (i as f64 + 0.5) / display_bins as f64;
                (pos, self.working[binning.bucket_range(i).start])
            })
            .collect();

        let bin_count = self.working.len();
        let mut right_idx = 0;
        for (bin, slot) in self.working.iter_mut().enumerate() {
            let pos = bin as f64 / bin_count as f64;

            // First anchor at or after pos (or the last one)
            while right_idx + 1 < anchors.len() && anchors[right_idx].0 < pos {
                right_idx += 1;
            }
            let right = anchors[right_idx];
            let left = if right.0 <= pos || right_idx == 0 {
                right
            } else {
                anchors[right_idx - 1]
            };

            *slot = if right.0 == left.0 {
                left.1
            } else {
                let t = (pos - left.0) / (right.0 - left.0);
                left.1 + t * (right.1 - left.1)
            };
        }
    }
}

#[cfg(test)]
mod tests;
