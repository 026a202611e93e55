use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "offerpipe",
    about = "Turns rendered telecom offer pages into canonical, deduplicated CSV rows",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a run of rendered pages: extract, dedupe, write CSV, optionally upsert
    Run {
        /// Input file with one JSON page payload per line ("-" for stdin)
        #[arg(long)]
        input: PathBuf,

        /// CSV output path (defaults to config, then offers_<date>.csv)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Operator name stamped on every row (overrides config)
        #[arg(long)]
        operator: Option<String>,

        /// Also upsert the rows to the configured record store
        #[arg(long)]
        upsert: bool,
    },

    /// Extract a few pages and print the canonical rows as JSON
    Preview {
        /// Input file with one JSON page payload per line ("-" for stdin)
        #[arg(long)]
        input: PathBuf,

        /// Maximum number of pages to preview
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Operator name stamped on every row (overrides config)
        #[arg(long)]
        operator: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active configuration and its path
    Show,
    /// Write a default config file
    Init,
}
