//! Viewer session state
//!
//! Central state for one viewing session: the loaded store, which record
//! is current, the editor holding the working histogram, and the active
//! metric. Every interaction goes through this struct and returns what the
//! UI needs to redraw, so the whole interaction loop runs without a UI.

use rand::Rng;

use crate::editor::HistogramEditor;
use crate::matcher::{find_nearest, Match};
use crate::metrics::{distance, Metric};
use crate::models::{Canvas, HistogramRecord, Point};
use crate::render::HistogramOverlay;
use crate::store::{HistogramStore, LoadError};

/// Result of a distance recompute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    /// Metric the distances were computed with
    pub metric: Metric,
    /// Distance from the working histogram to the record that was current
    /// before the scan
    pub current_distance: f64,
    /// Closest record found by the scan
    pub nearest: Option<Match>,
    /// Whether the current record changed to `nearest`
    pub switched: bool,
}

impl MatchOutcome {
    /// Caption for the distance read-out, e.g. `L2 Distance: 1.4142`.
    pub fn distance_caption(&self) -> String {
        format!(
            "{} Distance: {:.4}",
            self.metric.label(),
            self.current_distance
        )
    }
}

/// One user's interactive session over a loaded store.
#[derive(Debug, Clone)]
pub struct ViewerSession {
    store: HistogramStore,
    current: usize,
    editor: HistogramEditor,
    metric: Metric,
}

impl ViewerSession {
    /// Start a session on the first record.
    pub fn new(store: HistogramStore, metric: Metric) -> Result<Self, LoadError> {
        let first = store.get(0).ok_or(LoadError::NoData)?;
        let editor = HistogramEditor::new(&first.histogram, store.global_max());
        Ok(Self {
            store,
            current: 0,
            editor,
            metric,
        })
    }

    pub fn store(&self) -> &HistogramStore {
        &self.store
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &HistogramRecord {
        &self.store.records()[self.current]
    }

    pub fn working(&self) -> &[f64] {
        self.editor.working()
    }

    pub fn editor(&self) -> &HistogramEditor {
        &self.editor
    }

    pub fn is_dragging(&self) -> bool {
        self.editor.is_dragging()
    }

    /// Make record `index` current and start editing a fresh copy of it.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn select(&mut self, index: usize) -> Option<MatchOutcome> {
        let record = self.store.get(index)?;
        self.editor.reset(&record.histogram);
        self.current = index;
        Some(self.recompute())
    }

    /// Select a uniformly random record.
    pub fn select_random<R: Rng>(&mut self, rng: &mut R) -> MatchOutcome {
        let index = rng.gen_range(0..self.store.len());
        log::debug!("Random selection: {}", self.store.records()[index].path);
        match self.select(index) {
            Some(outcome) => outcome,
            None => self.recompute(),
        }
    }

    /// Info line for the current record, e.g. `a/b.jpg (640×480)`.
    pub fn current_caption(&self) -> String {
        let record = self.current();
        format!("{} ({})", record.path, record.image_shape)
    }

    /// Info line after a match switched the current record.
    pub fn match_caption(&self, outcome: &MatchOutcome) -> Option<String> {
        let nearest = outcome.nearest.filter(|_| outcome.switched)?;
        let record = self.store.get(nearest.index)?;
        Some(format!(
            "Closest match ({}): {} ({:.4})",
            outcome.metric, record.path, nearest.distance
        ))
    }

    /// Restore the working histogram to the current record's original.
    pub fn reset(&mut self) -> MatchOutcome {
        let original = &self.store.records()[self.current].histogram;
        self.editor.reset(original);
        self.recompute()
    }

    /// Switch metric and recompute.
    pub fn set_metric(&mut self, metric: Metric) -> MatchOutcome {
        self.metric = metric;
        self.recompute()
    }

    pub fn pointer_down(&mut self, pos: Point, canvas: Canvas) {
        self.editor.pointer_down(pos, canvas);
    }

    pub fn pointer_move(&mut self, pos: Point, canvas: Canvas) {
        self.editor.pointer_move(pos, canvas);
    }

    /// Release the pointer and recompute the match.
    pub fn pointer_up(&mut self) -> MatchOutcome {
        self.editor.pointer_up();
        self.recompute()
    }

    /// The pointer left the surface; same as releasing it.
    pub fn pointer_leave(&mut self) -> MatchOutcome {
        self.editor.pointer_leave();
        self.recompute()
    }

    /// Distance to the current record, then a full scan for the closest
    /// record. The current record switches to the winner when it differs;
    /// the working histogram is kept.
    pub fn recompute(&mut self) -> MatchOutcome {
        let working = self.editor.working();
        let current_distance = distance(self.metric, working, &self.current().histogram);
        let nearest = find_nearest(working, self.store.records(), self.metric);

        let switched = match nearest {
            Some(m) if m.index != self.current => {
                log::debug!(
                    "Closest match ({}): {} ({:.4})",
                    self.metric,
                    self.store.records()[m.index].path,
                    m.distance
                );
                self.current = m.index;
                true
            }
            _ => false,
        };

        MatchOutcome {
            metric: self.metric,
            current_distance,
            nearest,
            switched,
        }
    }

    /// Bars for the working and current original histograms.
    pub fn overlay(&self, canvas: Canvas) -> HistogramOverlay {
        HistogramOverlay::new(self.working(), &self.current().histogram, canvas)
    }
}
