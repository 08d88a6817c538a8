use std::path::PathBuf;
use std::time::Instant;

use histmatch_core::config::config_handle;
use histmatch_core::indexer::build_index;

/// Build chunk files from a folder of images.
pub fn cmd_index(
    images_dir: PathBuf,
    out: Option<PathBuf>,
    bins: Option<u32>,
    chunk_size: Option<usize>,
    threads: Option<usize>,
) -> Result<(), String> {
    let start = Instant::now();
    let config = &config_handle().config;

    if !images_dir.is_dir() {
        return Err(format!("Image folder not found: {}", images_dir.display()));
    }

    let out_dir = out.unwrap_or_else(|| config.data_dir.clone());
    let mut options = config.index_options();
    if let Some(bins) = bins {
        options.bins_per_channel = bins;
    }
    if let Some(chunk_size) = chunk_size {
        options.chunk_size = chunk_size;
    }

    // Configure thread pool if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("Using {} threads for parallel processing", num_threads);
    }

    println!(
        "Indexing {} ({} bins per channel, {} records per chunk)",
        images_dir.display(),
        options.bins_per_channel,
        options.chunk_size
    );

    let summary = build_index(&images_dir, &out_dir, options).map_err(|e| e.to_string())?;

    println!(
        "Indexed {} of {} images into {} chunk(s) in {}",
        summary.indexed,
        summary.images_found,
        summary.chunks,
        out_dir.display()
    );
    if summary.skipped > 0 {
        println!("  Skipped {} unreadable image(s)", summary.skipped);
    }
    println!("Done in {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
