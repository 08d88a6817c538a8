//! Benchmarks for histmatch-core search and editing
//!
//! Run with: cargo bench -p histmatch-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use histmatch_core::editor::HistogramEditor;
use histmatch_core::matcher::find_nearest;
use histmatch_core::metrics::Metric;
use histmatch_core::models::{Canvas, HistogramRecord, ImageShape, Point};
use histmatch_core::render::HistogramOverlay;

const BINS: usize = 512;

/// Generate synthetic normalized histograms
fn generate_records(count: usize) -> Vec<HistogramRecord> {
    (0..count)
        .map(|i| {
            let mut histogram: Vec<f64> = (0..BINS)
                .map(|b| ((i * 31 + b * 17) % 101) as f64 + 1.0)
                .collect();
            let sum: f64 = histogram.iter().sum();
            histogram.iter_mut().for_each(|v| *v /= sum);

            HistogramRecord {
                path: format!("style/{}.jpg", i),
                image_path: format!("style/{}.jpg", i),
                image_shape: ImageShape::with_channels(600, 800, 3),
                histogram,
                bins: None,
            }
        })
        .collect()
}

/// Benchmark the full nearest-neighbor scan
fn bench_find_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_nearest");

    for count in [1_000, 10_000, 50_000].iter() {
        let records = generate_records(*count);
        let query = records[count / 2].histogram.clone();

        group.throughput(Throughput::Elements(*count as u64));

        for metric in Metric::all() {
            group.bench_with_input(
                BenchmarkId::new(metric.name(), count),
                &records,
                |b, records| {
                    b.iter(|| find_nearest(black_box(&query), black_box(records), *metric));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark a drag across the canvas and the overlay redraw
fn bench_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");
    let records = generate_records(1);
    let original = &records[0].histogram;

    for width in [256.0, 1024.0].iter() {
        let canvas = Canvas::new(*width, 300.0);

        group.bench_with_input(
            BenchmarkId::new("drag", *width as u32),
            &canvas,
            |b, canvas| {
                b.iter(|| {
                    let mut editor = HistogramEditor::new(original, 1.0);
                    editor.pointer_down(Point::new(0.0, 150.0), *canvas);
                    for step in 1..32 {
                        let x = canvas.width * step as f64 / 32.0;
                        editor.pointer_move(Point::new(x, 100.0 + step as f64), *canvas);
                    }
                    editor.pointer_up();
                    black_box(editor.working()[0])
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("overlay", *width as u32),
            &canvas,
            |b, canvas| {
                b.iter(|| HistogramOverlay::new(black_box(original), black_box(original), *canvas));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_find_nearest, bench_editing);
criterion_main!(benches);
