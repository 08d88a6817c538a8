//! Application state management
//!
//! Dataset loading runs on a worker thread that reports per-chunk progress
//! over a channel; the UI thread drains it each frame and owns everything
//! else.

use eframe::egui;
use histmatch_core::{
    ChunkLoader, DirChunkSource, HistogramStore, LoadError, LoadEvent, LoadProgress,
};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Message from the loader thread.
#[derive(Debug)]
pub enum LoaderMessage {
    /// Chunk discovery finished
    Discovered(usize),
    /// One chunk was processed
    Progress(LoadProgress),
    /// Loading finished
    Done(Result<HistogramStore, LoadError>),
}

/// Start loading `data_dir` on a worker thread.
///
/// `ctx` is asked to repaint after every message so progress shows promptly.
pub fn spawn_loader(data_dir: PathBuf, ctx: egui::Context) -> Receiver<LoaderMessage> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        log::info!("Loading histograms from {}", data_dir.display());
        let mut loader = ChunkLoader::new(DirChunkSource::new(&data_dir));
        // A closed receiver means the UI moved on; stop quietly.
        if tx.send(LoaderMessage::Discovered(loader.total_chunks())).is_err() {
            return;
        }
        ctx.request_repaint();

        for event in &mut loader {
            if let LoadEvent::Skipped { index, reason, .. } = &event {
                log::debug!("Chunk {} skipped: {}", index, reason);
            }
            if tx.send(LoaderMessage::Progress(event.progress())).is_err() {
                return;
            }
            ctx.request_repaint();
        }

        let _ = tx.send(LoaderMessage::Done(loader.finish()));
        ctx.request_repaint();
    });

    rx
}

/// Where the app is in its lifecycle.
pub enum LoadPhase {
    /// Waiting for chunks
    Loading {
        data_dir: PathBuf,
        receiver: Receiver<LoaderMessage>,
        progress: LoadProgress,
    },
    /// Data ready for browsing
    Ready,
    /// Loading failed; nothing to browse
    Failed(String),
}

impl LoadPhase {
    pub fn start(data_dir: PathBuf, ctx: &egui::Context) -> Self {
        let receiver = spawn_loader(data_dir.clone(), ctx.clone());
        LoadPhase::Loading {
            data_dir,
            receiver,
            progress: LoadProgress::default(),
        }
    }

    /// Drain pending loader messages. Returns the store once loading is done.
    pub fn poll(&mut self) -> Option<Result<HistogramStore, LoadError>> {
        let LoadPhase::Loading {
            receiver, progress, ..
        } = self
        else {
            return None;
        };

        loop {
            match receiver.try_recv() {
                Ok(LoaderMessage::Discovered(total)) => progress.total_chunks = total,
                Ok(LoaderMessage::Progress(p)) => *progress = p,
                Ok(LoaderMessage::Done(result)) => return Some(result),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    return Some(Err(LoadError::Invalid(
                        "loader thread stopped unexpectedly".to_string(),
                    )))
                }
            }
        }
    }

    /// Status line for the loading screen.
    pub fn status_text(&self) -> String {
        match self {
            LoadPhase::Loading {
                data_dir, progress, ..
            } => {
                if progress.total_chunks == 0 {
                    format!("Looking for chunks in {}...", data_dir.display())
                } else {
                    progress.to_string()
                }
            }
            LoadPhase::Ready => String::new(),
            LoadPhase::Failed(message) => format!("Error: {}", message),
        }
    }

    /// Fraction of chunks loaded, for the progress bar
    pub fn fraction(&self) -> f32 {
        match self {
            LoadPhase::Loading { progress, .. } => progress.percent() as f32 / 100.0,
            LoadPhase::Ready => 1.0,
            LoadPhase::Failed(_) => 0.0,
        }
    }
}
