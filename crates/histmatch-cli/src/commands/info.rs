use std::path::PathBuf;

use histmatch_cli::load_store;
use histmatch_core::config::config_handle;

/// Print a summary of a histogram dataset.
pub fn cmd_info(data: Option<PathBuf>) -> Result<(), String> {
    let data_dir = data.unwrap_or_else(|| config_handle().config.data_dir.clone());
    let store = load_store(&data_dir)?;

    println!("Data directory: {}", data_dir.display());
    println!(
        "Chunks:         {} of {} loaded",
        store.loaded_chunks(),
        store.total_chunks()
    );
    println!("Images:         {}", store.len());
    println!("Bins:           {}", store.bin_count());
    println!("Global max:     {:.6}", store.global_max());

    if let Some(first) = store.get(0) {
        if let Some(bins) = &first.bins {
            println!("Bin layout:     {}", serde_json::to_string(bins).unwrap_or_default());
        }
    }

    Ok(())
}
