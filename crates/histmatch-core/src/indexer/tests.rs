//! Tests for the histogram indexer

use super::*;
use crate::store::{DirChunkSource, HistogramStore};
use image::{Rgb, RgbImage};
use tempfile::tempdir;

fn save_solid(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_pixel(width, height, Rgb(color))
        .save(path)
        .unwrap();
}

#[test]
fn test_solid_color_lands_in_one_bin() {
    let img = RgbImage::from_pixel(4, 3, Rgb([255, 0, 0]));
    let hist = compute_bgr_histogram(&img, 8);

    assert_eq!(hist.len(), 512);
    // Pure red: b = 0, g = 0, r = 7
    assert_eq!(hist[7], 1.0);
    assert_eq!(hist.iter().filter(|v| **v > 0.0).count(), 1);
}

#[test]
fn test_channel_order_is_bgr() {
    let mut img = RgbImage::new(2, 1);
    img.put_pixel(0, 0, Rgb([0, 0, 255]));
    img.put_pixel(1, 0, Rgb([0, 128, 0]));
    let hist = compute_bgr_histogram(&img, 8);

    // Pure blue: b = 7
    assert_eq!(hist[7 * 64], 0.5);
    // Mid green: g = 4
    assert_eq!(hist[4 * 8], 0.5);
}

#[test]
fn test_histogram_sums_to_one() {
    let img = RgbImage::from_fn(16, 9, |x, y| Rgb([(x * 16) as u8, (y * 28) as u8, 77]));
    for bins in [1, 2, 8, 16] {
        let hist = compute_bgr_histogram(&img, bins);
        assert_eq!(hist.len(), (bins * bins * bins) as usize);
        let sum: f64 = hist.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_empty_image_is_all_zero() {
    let hist = compute_bgr_histogram(&RgbImage::new(0, 0), 2);
    assert_eq!(hist, vec![0.0; 8]);
}

#[test]
fn test_supported_extensions() {
    assert!(is_supported_image(Path::new("a/b.JPG")));
    assert!(is_supported_image(Path::new("x.webp")));
    assert!(!is_supported_image(Path::new("notes.txt")));
    assert!(!is_supported_image(Path::new("noext")));
}

#[test]
fn test_record_key_is_relative_with_slashes() {
    let root = Path::new("/data/images");
    let path = root.join("Impressionism").join("monet.jpg");
    assert_eq!(record_key(root, &path), "Impressionism/monet.jpg");
}

#[test]
fn test_collect_images_recurses_and_sorts() {
    let dir = tempdir().unwrap();
    save_solid(&dir.path().join("b.png"), 2, 2, [0, 0, 0]);
    save_solid(&dir.path().join("a/c.png"), 2, 2, [0, 0, 0]);
    std::fs::write(dir.path().join("readme.txt"), "skip me").unwrap();

    let images = collect_images(dir.path()).unwrap();
    let keys: Vec<String> = images.iter().map(|p| record_key(dir.path(), p)).collect();
    assert_eq!(keys, vec!["a/c.png", "b.png"]);
}

#[test]
fn test_index_round_trips_through_store() {
    let images = tempdir().unwrap();
    let chunks = tempdir().unwrap();
    save_solid(&images.path().join("red.png"), 6, 4, [255, 0, 0]);
    save_solid(&images.path().join("blue.png"), 3, 5, [0, 0, 255]);
    save_solid(&images.path().join("styles/grey.png"), 2, 2, [128, 128, 128]);

    let options = IndexOptions {
        bins_per_channel: 8,
        chunk_size: 2,
    };
    let summary = build_index(images.path(), chunks.path(), options).unwrap();
    assert_eq!(
        summary,
        IndexSummary {
            images_found: 3,
            indexed: 3,
            skipped: 0,
            chunks: 2,
        }
    );

    let store = HistogramStore::load(DirChunkSource::new(chunks.path())).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.total_chunks(), 2);
    assert_eq!(store.bin_count(), 512);
    assert_eq!(store.global_max(), 1.0);

    let paths: Vec<&str> = store.records().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["blue.png", "red.png", "styles/grey.png"]);

    let red = &store.records()[1];
    assert_eq!(red.image_shape, ImageShape::with_channels(4, 6, 3));
    assert_eq!(red.bins, Some(BinSpec::PerChannel(8)));
    assert_eq!(red.histogram[7], 1.0);
}

#[test]
fn test_reindex_removes_stale_chunks() {
    let chunks = tempdir().unwrap();
    for (index, key) in ["old0", "old1", "old2"].iter().enumerate() {
        let json = format!(
            r#"{{"{}": {{"img_path": "{}", "img_shape": [1, 1], "histogram": [1.0, 0.0]}}}}"#,
            key, key
        );
        std::fs::write(chunks.path().join(chunk_file_name(index)), json).unwrap();
    }

    let record = RawRecord {
        img_path: "new".to_string(),
        img_shape: ImageShape::new(1, 1),
        histogram: vec![0.0, 1.0],
        bins: None,
    };
    let written = write_chunks(chunks.path(), &[("new".to_string(), record)], 10).unwrap();
    assert_eq!(written, 1);
    assert!(!chunks.path().join(chunk_file_name(1)).exists());
    assert!(!chunks.path().join(chunk_file_name(2)).exists());

    let store = HistogramStore::load(DirChunkSource::new(chunks.path())).unwrap();
    let paths: Vec<&str> = store.records().iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["new"]);
    assert_eq!(store.total_chunks(), 1);
}

#[test]
fn test_unreadable_image_is_skipped() {
    let images = tempdir().unwrap();
    let chunks = tempdir().unwrap();
    save_solid(&images.path().join("good.png"), 2, 2, [10, 20, 30]);
    std::fs::write(images.path().join("broken.jpg"), b"not an image").unwrap();

    let summary = build_index(images.path(), chunks.path(), IndexOptions::default()).unwrap();
    assert_eq!(summary.images_found, 2);
    assert_eq!(summary.indexed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.chunks, 1);
}

#[test]
fn test_empty_folder_is_an_error() {
    let images = tempdir().unwrap();
    let chunks = tempdir().unwrap();
    let err = build_index(images.path(), chunks.path(), IndexOptions::default()).unwrap_err();
    assert!(matches!(err, IndexError::NoImages(_)));
}

#[test]
fn test_invalid_options_rejected() {
    let images = tempdir().unwrap();
    let bad_bins = IndexOptions {
        bins_per_channel: 0,
        chunk_size: 10,
    };
    assert!(matches!(
        build_index(images.path(), images.path(), bad_bins),
        Err(IndexError::InvalidOptions(_))
    ));
    assert!(matches!(
        write_chunks(images.path(), &[], 0),
        Err(IndexError::InvalidOptions(_))
    ));
}
