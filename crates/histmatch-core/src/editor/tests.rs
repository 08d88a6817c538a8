//! Tests for the histogram editor

use super::*;

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}

fn assert_clamped(editor: &HistogramEditor) {
    for (i, v) in editor.working().iter().enumerate() {
        assert!(
            *v >= 0.0 && *v <= editor.global_max(),
            "bin {} = {} outside [0, {}]",
            i,
            v,
            editor.global_max()
        );
    }
}

#[test]
fn test_value_at_height_log_scale() {
    // Top of the surface is 1.0
    assert_close(value_at_height(0.0, 900.0), 1.0 - LOG_EPSILON);
    // Bottom is the epsilon floor shifted back to zero
    assert!(value_at_height(900.0, 900.0).abs() < 1e-20);
    // One ninth of the way down is one decade lower
    assert_close(value_at_height(100.0, 900.0), 0.1 - LOG_EPSILON);
    assert_close(value_at_height(450.0, 900.0), 10f64.powf(-4.5) - LOG_EPSILON);
}

#[test]
fn test_log_min_matches_epsilon() {
    assert_close(LOG_EPSILON.log10(), LOG_MIN);
}

#[test]
fn test_binning_covers_every_bin_once() {
    for bin_count in [1usize, 2, 3, 7, 64, 512, 1000] {
        for width in [1.0, 2.0, 5.0, 63.5, 100.0, 333.0, 2048.0] {
            let binning = DisplayBinning::new(bin_count, Canvas::new(width, 100.0));
            let display_bins = binning.display_bins();
            assert_eq!(display_bins, bin_count.min(width as usize));

            let mut owner = vec![None; bin_count];
            for bucket in 0..display_bins {
                let range = binning.bucket_range(bucket);
                assert!(!range.is_empty(), "bucket {} empty", bucket);
                for bin in range {
                    assert!(owner[bin].is_none(), "bin {} in two buckets", bin);
                    owner[bin] = Some(bucket);
                }
            }
            for (bin, bucket) in owner.iter().enumerate() {
                assert_eq!(*bucket, binning.bucket_of_bin(bin));
            }
        }
    }
}

#[test]
fn test_bucket_at_edges() {
    let binning = DisplayBinning::new(4, Canvas::new(400.0, 100.0));
    assert_eq!(binning.bucket_width(), 100.0);
    assert_eq!(binning.bucket_at(0.0), Some(0));
    assert_eq!(binning.bucket_at(399.9), Some(3));
    assert_eq!(binning.bucket_at(400.0), None);
    assert_eq!(binning.bucket_at(-0.1), None);
}

#[test]
fn test_point_edit_sets_bucket() {
    let canvas = Canvas::new(400.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.5, 0.5, 0.5, 0.5], 1.0);

    editor.apply_point(Point::new(150.0, 100.0), canvas);

    assert_eq!(editor.working()[0], 0.5);
    assert_close(editor.working()[1], 0.1 - LOG_EPSILON);
    assert_eq!(editor.working()[2], 0.5);
    assert_eq!(editor.working()[3], 0.5);
}

#[test]
fn test_point_edit_clamps_to_global_max() {
    let canvas = Canvas::new(4.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.01, 0.01, 0.01, 0.01], 0.05);

    // Top of the surface asks for ~1.0, capped at the dataset max
    editor.apply_point(Point::new(0.5, 0.0), canvas);
    assert_eq!(editor.working()[0], 0.05);

    // Below the surface the value goes negative before clamping
    editor.apply_point(Point::new(1.5, 1000.0), canvas);
    assert_eq!(editor.working()[1], 0.0);
    assert_clamped(&editor);
}

#[test]
fn test_point_edit_outside_surface_changes_nothing() {
    let canvas = Canvas::new(4.0, 900.0);
    let original = [0.2, 0.3, 0.4, 0.1];
    let mut editor = HistogramEditor::new(&original, 1.0);

    editor.apply_point(Point::new(4.0, 0.0), canvas);
    editor.apply_point(Point::new(-1.0, 0.0), canvas);

    assert_eq!(editor.working(), &original);
}

#[test]
fn test_point_edit_resamples_collapsed_bins() {
    // 8 bins on 4 columns: two bins per bucket
    let canvas = Canvas::new(4.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 8], 1.0);

    // Bucket 1 (bins 2..4) to 0.1
    editor.apply_point(Point::new(1.5, 100.0), canvas);
    let v = 0.1 - LOG_EPSILON;
    let w = editor.working();

    // Anchors at 0.125, 0.375, 0.625, 0.875 with values 0, v, 0, 0
    assert_eq!(w[0], 0.0); // before the first anchor
    assert_eq!(w[1], 0.0); // exactly on the first anchor
    assert_close(w[2], v * 0.5);
    assert_close(w[3], v); // exactly on the second anchor
    assert_close(w[4], v * 0.5);
    assert_eq!(w[5], 0.0);
    assert_eq!(w[7], 0.0); // past the last anchor
    assert!(w.iter().all(|x| x.is_finite()));
}

#[test]
fn test_resample_never_produces_nan() {
    let canvas = Canvas::new(3.0, 100.0);
    let original: Vec<f64> = (0..12).map(|i| i as f64 / 12.0).collect();
    let mut editor = HistogramEditor::new(&original, 1.0);

    editor.apply_point(Point::new(2.2, 50.0), canvas);

    assert!(editor.working().iter().all(|v| v.is_finite()));
    assert_clamped(&editor);
}

#[test]
fn test_drag_interpolates_between_endpoints() {
    let canvas = Canvas::new(5.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 5], 1.0);

    // From bucket 0 at 0.1 to bucket 4 at 0.5 (linear ends)
    let from = Point::new(0.5, 100.0);
    let to = Point::new(4.5, 900.0 * (1.0 - (0.5f64.log10() + 9.0) / 9.0));
    assert!(editor.apply_drag(from, to, canvas));

    let start = 0.1 - LOG_EPSILON;
    let end = 0.5 - LOG_EPSILON;
    for (i, v) in editor.working().iter().enumerate() {
        assert_close(*v, start + (end - start) * i as f64 / 4.0);
    }
}

#[test]
fn test_drag_leftward_ramps_from_leftmost_bucket() {
    let canvas = Canvas::new(10.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 10], 1.0);

    // Start on the right at the top, end on the left at the bottom: the
    // leftmost bucket still takes the start value
    assert!(editor.apply_drag(Point::new(8.5, 0.0), Point::new(2.5, 900.0), canvas));

    let w = editor.working();
    assert_close(w[2], 1.0 - LOG_EPSILON);
    assert!(w[8].abs() < 1e-12);
    for i in 2..8 {
        assert!(w[i] > w[i + 1], "ramp not decreasing at bucket {}", i);
    }
    // Outside the drag span
    assert_eq!(w[0], 0.0);
    assert_eq!(w[1], 0.0);
    assert_eq!(w[9], 0.0);
}

#[test]
fn test_drag_clipped_left_keeps_ramp_origin() {
    let canvas = Canvas::new(4.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 4], 1.0);

    // From x = -4 (bucket -4) at the top to bucket 3 at the bottom; the ramp
    // is measured from bucket -4 so bucket 0 is already 4/7 of the way down
    assert!(editor.apply_drag(Point::new(-3.5, 0.0), Point::new(3.5, 900.0), canvas));

    let start = 1.0 - LOG_EPSILON;
    let end = 0.0;
    let w = editor.working();
    for (i, v) in w.iter().enumerate() {
        let ratio = (i as f64 + 4.0) / 7.0;
        assert_close(*v, start + (end - start) * ratio);
    }
}

#[test]
fn test_drag_within_one_bucket_is_noop() {
    let canvas = Canvas::new(4.0, 900.0);
    let original = [0.3, 0.3, 0.3, 0.3];
    let mut editor = HistogramEditor::new(&original, 1.0);

    assert!(!editor.apply_drag(Point::new(1.1, 0.0), Point::new(1.9, 900.0), canvas));
    assert_eq!(editor.working(), &original);
}

#[test]
fn test_drag_does_not_resample_collapsed_bins() {
    // 8 bins on 4 columns: a drag writes whole buckets only
    let canvas = Canvas::new(4.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 8], 1.0);

    assert!(editor.apply_drag(Point::new(0.5, 100.0), Point::new(1.5, 100.0), canvas));

    for v in &editor.working()[..4] {
        assert_close(*v, 0.1 - LOG_EPSILON);
    }
    assert_eq!(&editor.working()[4..], &[0.0; 4]);
}

#[test]
fn test_drag_past_the_edge_only_touches_visible_buckets() {
    let canvas = Canvas::new(4.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 4], 1.0);

    assert!(editor.apply_drag(Point::new(2.5, 100.0), Point::new(9.0, 100.0), canvas));

    assert_eq!(editor.working().len(), 4);
    assert_eq!(&editor.working()[..2], &[0.0, 0.0]);
    assert_close(editor.working()[3], 0.1 - LOG_EPSILON);
}

#[test]
fn test_state_machine() {
    let canvas = Canvas::new(4.0, 900.0);
    let mut editor = HistogramEditor::new(&[0.0; 4], 1.0);
    assert_eq!(editor.state(), DragState::Idle);

    // Moves while idle are ignored
    editor.pointer_move(Point::new(1.5, 0.0), canvas);
    assert_eq!(editor.working(), &[0.0; 4]);

    editor.pointer_down(Point::new(0.5, 100.0), canvas);
    assert_eq!(
        editor.state(),
        DragState::Dragging {
            last: Point::new(0.5, 100.0)
        }
    );
    assert_close(editor.working()[0], 0.1 - LOG_EPSILON);

    editor.pointer_move(Point::new(3.5, 100.0), canvas);
    assert_eq!(
        editor.state(),
        DragState::Dragging {
            last: Point::new(3.5, 100.0)
        }
    );
    for v in editor.working() {
        assert_close(*v, 0.1 - LOG_EPSILON);
    }

    assert!(editor.pointer_up());
    assert_eq!(editor.state(), DragState::Idle);
    assert!(!editor.pointer_leave());
}

#[test]
fn test_reset_restores_original_after_edits() {
    let canvas = Canvas::new(3.0, 200.0);
    let original: Vec<f64> = vec![0.1, 0.0, 0.3, 0.05, 0.2, 0.15, 0.0, 0.2];
    let mut editor = HistogramEditor::new(&original, 0.3);

    editor.pointer_down(Point::new(0.2, 10.0), canvas);
    editor.pointer_move(Point::new(2.9, 150.0), canvas);
    editor.pointer_move(Point::new(1.0, 30.0), canvas);
    editor.pointer_up();
    assert_ne!(editor.working(), original.as_slice());

    editor.reset(&original);
    assert_eq!(editor.working(), original.as_slice());
}

#[test]
fn test_clamp_invariant_over_edit_sequence() {
    let canvas = Canvas::new(37.0, 120.0);
    let original: Vec<f64> = (0..100).map(|i| ((i * 7919) % 97) as f64 / 970.0).collect();
    let global_max = original.iter().cloned().fold(0.0, f64::max);
    let mut editor = HistogramEditor::new(&original, global_max);

    let path = [
        (-3.0, -10.0),
        (5.0, 0.0),
        (18.3, 60.0),
        (36.9, 119.0),
        (40.0, 200.0),
        (12.0, 1.0),
        (0.0, 120.0),
    ];

    editor.pointer_down(Point::new(path[0].0, path[0].1), canvas);
    for (x, y) in &path[1..] {
        editor.pointer_move(Point::new(*x, *y), canvas);
        assert_clamped(&editor);
    }
    editor.pointer_leave();
    assert_clamped(&editor);
}

#[test]
fn test_zero_width_canvas_is_ignored() {
    let canvas = Canvas::new(0.0, 100.0);
    let mut editor = HistogramEditor::new(&[0.2, 0.4], 1.0);

    editor.pointer_down(Point::new(0.0, 0.0), canvas);
    editor.pointer_move(Point::new(10.0, 0.0), canvas);

    assert_eq!(editor.working(), &[0.2, 0.4]);
}
