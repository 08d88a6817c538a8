use clap::{Args, Parser, Subcommand};
use histmatch_cli::{init_logging, parse_histogram, parse_metric, parse_positive};
use histmatch_core::config::{init_config, log_config_usage};
use histmatch_core::Metric;
use std::path::PathBuf;

mod commands;

use commands::{cmd_index, cmd_info, cmd_match, MatchQuery};

#[derive(Parser)]
#[command(name = "histmatch")]
#[command(version, about = "Color-histogram indexing and nearest-image search", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default search locations
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute histograms for a folder of images and write chunk files
    Index {
        /// Folder of images (searched recursively)
        #[arg(value_name = "IMAGES_DIR")]
        images_dir: PathBuf,

        /// Output directory for chunk files (default: data_dir from config)
        #[arg(short, long, value_name = "CHUNKS_DIR")]
        out: Option<PathBuf>,

        /// Histogram bins per color channel
        #[arg(long, value_name = "N")]
        bins: Option<u32>,

        /// Records per chunk file
        #[arg(long, value_name = "N", value_parser = parse_positive)]
        chunk_size: Option<usize>,

        /// Number of parallel threads
        #[arg(short = 'j', long, value_name = "N")]
        threads: Option<usize>,
    },

    /// Summarize a histogram dataset
    Info {
        /// Directory holding chunk files
        #[arg(long, value_name = "DIR")]
        data: Option<PathBuf>,
    },

    /// Find the images with the closest histograms
    Match {
        /// Directory holding chunk files
        #[arg(long, value_name = "DIR")]
        data: Option<PathBuf>,

        #[command(flatten)]
        query: QueryArgs,

        /// Distance metric: "hellinger" or "l2" (default: from config)
        #[arg(long, value_name = "METRIC", value_parser = parse_metric)]
        metric: Option<Metric>,

        /// Number of matches to list
        #[arg(long, value_name = "N", default_value = "1", value_parser = parse_positive)]
        top: usize,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct QueryArgs {
    /// Use the stored histogram of this image key
    #[arg(long, value_name = "KEY")]
    key: Option<String>,

    /// Use the stored histogram of a random image
    #[arg(long)]
    random: bool,

    /// Use an explicit histogram (comma-separated values)
    #[arg(long, value_name = "CSV")]
    histogram: Option<String>,
}

impl QueryArgs {
    fn into_query(self) -> Result<MatchQuery, String> {
        if let Some(key) = self.key {
            Ok(MatchQuery::Key(key))
        } else if let Some(csv) = self.histogram {
            parse_histogram(&csv).map(MatchQuery::Histogram)
        } else {
            Ok(MatchQuery::Random)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    init_config(cli.config.as_deref());
    log_config_usage();

    let result = match cli.command {
        Commands::Index {
            images_dir,
            out,
            bins,
            chunk_size,
            threads,
        } => cmd_index(images_dir, out, bins, chunk_size, threads),

        Commands::Info { data } => cmd_info(data),

        Commands::Match {
            data,
            query,
            metric,
            top,
            json,
        } => query
            .into_query()
            .and_then(|query| cmd_match(data, query, metric, top, json)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
