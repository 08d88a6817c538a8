//! Image preview and histogram canvas
//!
//! The canvas paints the session overlay and feeds raw pointer input to the
//! session in arrival order: press, move while pressed, release, and leaving
//! the canvas.

use eframe::egui;
use histmatch_core::render::Rgba;
use histmatch_core::{Canvas, MatchOutcome, Point, ViewerSession};
use std::path::Path;

/// Height of the histogram canvas in points
pub const CANVAS_HEIGHT: f32 = 300.0;

/// Pointer bookkeeping for the canvas across frames.
#[derive(Debug, Default)]
pub struct CanvasInput {
    hovered: bool,
}

fn to_color(rgba: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn to_point(pos: egui::Pos2, rect: egui::Rect) -> Point {
    let local = pos - rect.min;
    Point::new(local.x as f64, local.y as f64)
}

/// Draw the histogram canvas and apply pointer input.
///
/// Returns the outcome of a recompute when the pointer was released or
/// left the canvas this frame.
pub fn histogram_canvas(
    ui: &mut egui::Ui,
    session: &mut ViewerSession,
    input: &mut CanvasInput,
) -> Option<MatchOutcome> {
    let size = egui::vec2(ui.available_width(), CANVAS_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
    let rect = response.rect;
    let canvas = Canvas::new(rect.width() as f64, rect.height() as f64);

    // Walk this frame's raw events so a press and the moves after it each
    // use their own position
    let (events, latest) = ui.input(|i| (i.events.clone(), i.pointer.latest_pos()));

    let mut outcome = None;
    for event in events {
        match event {
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } if rect.contains(pos) => {
                if pressed {
                    session.pointer_down(to_point(pos, rect), canvas);
                } else {
                    outcome = Some(session.pointer_up());
                }
            }
            egui::Event::PointerMoved(pos) if session.is_dragging() && rect.contains(pos) => {
                session.pointer_move(to_point(pos, rect), canvas);
            }
            _ => {}
        }
    }

    let inside = latest.map(|p| rect.contains(p)).unwrap_or(false);
    if input.hovered && !inside && outcome.is_none() {
        outcome = Some(session.pointer_leave());
    }
    input.hovered = inside;

    painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
    let overlay = session.overlay(canvas);
    for series in overlay.series() {
        let color = to_color(series.color);
        for bar in &series.bars {
            if bar.height <= 0.0 {
                continue;
            }
            let min = egui::pos2(
                rect.left() + bar.x as f32,
                rect.top() + bar.top(canvas.height) as f32,
            );
            let max = egui::pos2(rect.left() + (bar.x + bar.width) as f32, rect.bottom());
            painter.rect_filled(egui::Rect::from_min_max(min, max), 0.0, color);
        }
    }

    outcome
}

/// Decode an image and shrink it so neither edge exceeds `max_dimension`.
pub fn load_preview(path: &Path, max_dimension: u32) -> Result<egui::ColorImage, String> {
    let image = image::open(path).map_err(|e| e.to_string())?;
    let image = downsample_image(image, max_dimension).to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}

/// Downsample image for fast preview
fn downsample_image(image: image::DynamicImage, max_dimension: u32) -> image::DynamicImage {
    let (width, height) = (image.width(), image.height());
    if width <= max_dimension && height <= max_dimension {
        return image;
    }
    // Triangle (bilinear) filter, aspect ratio preserved
    image.resize(
        max_dimension,
        max_dimension,
        image::imageops::FilterType::Triangle,
    )
}

/// Show `texture` scaled to fit the available space.
pub fn show_image(ui: &mut egui::Ui, texture: &egui::TextureHandle, max_height: f32) {
    let size = texture.size_vec2();
    let available = egui::vec2(ui.available_width(), max_height);
    let scale = (available.x / size.x).min(available.y / size.y).min(1.0);
    ui.add(egui::Image::new((texture.id(), size * scale)));
}
