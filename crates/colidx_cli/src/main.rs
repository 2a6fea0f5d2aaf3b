//! colidx CLI
//!
//! Command-line tools for sizing and trying out secondary indexes.
//!
//! # Commands
//!
//! - `estimate` - Predict the memory footprint of an index before building it
//! - `build` - Build every index kind over synthetic data and report sizes
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use colidx_core::IndexType;
use tracing_subscriber::EnvFilter;

/// colidx command-line index tools.
#[derive(Parser)]
#[command(name = "colidx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the memory footprint of an index
    Estimate {
        /// Number of indexed rows
        #[arg(short, long)]
        rows: usize,

        /// Number of distinct keys
        #[arg(short, long)]
        distinct: usize,

        /// Key width in bytes (sum over columns for composite keys)
        #[arg(short = 'w', long, default_value = "8")]
        value_bytes: u32,

        /// Index type (all types if omitted)
        #[arg(short = 't', long)]
        index_type: Option<IndexType>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Build indexes over a synthetic table and report their sizes
    Build {
        /// Rows per chunk
        #[arg(short, long, default_value = "10000")]
        rows: usize,

        /// Distinct integer values per column
        #[arg(short, long, default_value = "1000")]
        distinct: usize,

        /// Number of chunks
        #[arg(short, long, default_value = "4")]
        chunks: usize,

        /// Chunks covered by the partial hash index (all if omitted)
        #[arg(long)]
        covered: Option<usize>,

        /// Null rate in percent
        #[arg(short, long, default_value = "0")]
        nulls: u8,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Per-index memory budget in bytes
        #[arg(short, long)]
        budget: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Estimate {
            rows,
            distinct,
            value_bytes,
            index_type,
            format,
        } => {
            commands::estimate::run(rows, distinct, value_bytes, index_type, &format)?;
        }
        Commands::Build {
            rows,
            distinct,
            chunks,
            covered,
            nulls,
            seed,
            budget,
            format,
        } => {
            let options = commands::build::BuildOptions {
                rows,
                distinct,
                chunks,
                covered: covered.unwrap_or(chunks),
                null_percent: nulls.min(100),
                seed,
                budget,
            };
            commands::build::run(&options, &format)?;
        }
        Commands::Version => {
            println!("colidx CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("colidx Core v{}", colidx_core::VERSION);
        }
    }

    Ok(())
}
