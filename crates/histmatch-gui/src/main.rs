//! Histmatch GUI Application
//!
//! Browse an art dataset by color: draw on the histogram of the shown image
//! and the viewer jumps to the image whose histogram is closest.

mod app_state;
mod viewer;

use app_state::LoadPhase;
use eframe::egui;
use histmatch_core::config::{config_handle, log_config_usage};
use histmatch_core::{MatchOutcome, Metric, ViewerSession};
use std::path::PathBuf;
use viewer::CanvasInput;

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log_config_usage();

    let data_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config_handle().config.data_dir.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_title("Histmatch - Color Histogram Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "Histmatch",
        options,
        Box::new(move |cc| Ok(Box::new(HistmatchApp::new(data_dir, &cc.egui_ctx)))),
    )
}

struct HistmatchApp {
    phase: LoadPhase,
    session: Option<ViewerSession>,
    image_root: PathBuf,
    preview_max_dimension: u32,

    // Image panel
    texture: Option<egui::TextureHandle>,
    texture_index: Option<usize>,
    info_text: String,
    distance_text: String,

    // UI state
    metric: Metric,
    canvas_input: CanvasInput,
}

impl HistmatchApp {
    fn new(data_dir: PathBuf, ctx: &egui::Context) -> Self {
        let config = &config_handle().config;
        Self {
            phase: LoadPhase::start(data_dir, ctx),
            session: None,
            image_root: config.image_root.clone(),
            preview_max_dimension: config.preview_max_dimension,
            texture: None,
            texture_index: None,
            info_text: String::new(),
            distance_text: String::new(),
            metric: config.metric,
            canvas_input: CanvasInput::default(),
        }
    }

    fn open_data_folder(&mut self, data_dir: PathBuf, ctx: &egui::Context) {
        self.session = None;
        self.texture = None;
        self.texture_index = None;
        self.info_text.clear();
        self.distance_text.clear();
        self.phase = LoadPhase::start(data_dir, ctx);
    }

    fn poll_loader(&mut self) {
        let Some(result) = self.phase.poll() else {
            return;
        };

        match result.and_then(|store| ViewerSession::new(store, self.metric)) {
            Ok(session) => {
                self.session = Some(session);
                self.phase = LoadPhase::Ready;
                self.random_image();
            }
            Err(e) => {
                log::error!("Failed to load histograms: {}", e);
                self.phase = LoadPhase::Failed(e.to_string());
            }
        }
    }

    fn random_image(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let outcome = session.select_random(&mut rand::thread_rng());
        self.info_text = session.current_caption();
        self.apply_outcome(outcome);
    }

    fn reset_histogram(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let outcome = session.reset();
            self.apply_outcome(outcome);
        }
    }

    fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
        if let Some(session) = self.session.as_mut() {
            let outcome = session.set_metric(metric);
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: MatchOutcome) {
        self.distance_text = outcome.distance_caption();
        if let Some(caption) = self
            .session
            .as_ref()
            .and_then(|s| s.match_caption(&outcome))
        {
            self.info_text = caption;
        }
    }

    /// Reload the image texture when the current record changed.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let index = session.current_index();
        if self.texture_index == Some(index) {
            return;
        }
        self.texture_index = Some(index);

        let path = self.image_root.join(&session.current().path);
        match viewer::load_preview(&path, self.preview_max_dimension) {
            Ok(color_image) => {
                self.texture = Some(ctx.load_texture("preview", color_image, Default::default()));
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e);
                self.texture = None;
                self.info_text = format!("Image not found: {}", path.display());
            }
        }
    }

    fn show_loading(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 3.0);
            ui.heading("Loading histograms");
            ui.add_space(8.0);
            if matches!(self.phase, LoadPhase::Loading { .. }) {
                ui.add(
                    egui::ProgressBar::new(self.phase.fraction())
                        .desired_width(400.0)
                        .show_percentage(),
                );
            }
            ui.label(self.phase.status_text());
        });
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Random").clicked() {
                self.random_image();
            }
            if ui.button("Reset").clicked() {
                self.reset_histogram();
            }

            let mut metric = self.metric;
            egui::ComboBox::from_label("Metric")
                .selected_text(metric.name())
                .show_ui(ui, |ui| {
                    for m in Metric::all() {
                        ui.selectable_value(&mut metric, *m, m.name());
                    }
                });
            if metric != self.metric {
                self.set_metric(metric);
            }

            ui.separator();
            ui.label(&self.distance_text);
        });
    }
}

impl eframe::App for HistmatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open data folder...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.open_data_folder(dir, ctx);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Set image folder...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.image_root = dir;
                            self.texture_index = None;
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        if self.session.is_none() {
            egui::CentralPanel::default().show(ctx, |ui| self.show_loading(ui));
            return;
        }

        self.refresh_texture(ctx);

        egui::TopBottomPanel::bottom("histogram_panel")
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                self.show_controls(ui);
                ui.add_space(4.0);

                let outcome = match self.session.as_mut() {
                    Some(session) => viewer::histogram_canvas(ui, session, &mut self.canvas_input),
                    None => None,
                };
                if let Some(outcome) = outcome {
                    self.apply_outcome(outcome);
                }
                ui.add_space(4.0);
            });

        // The current image changed this frame; load it on the next one
        if self.session.as_ref().map(|s| s.current_index()) != self.texture_index {
            ctx.request_repaint();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(&self.info_text);
            ui.separator();
            let max_height = ui.available_height();
            match &self.texture {
                Some(texture) => viewer::show_image(ui, texture, max_height),
                None => {
                    ui.label("No image");
                }
            }
        });
    }
}
