//! Argument parsing, grounded on `riptide-cli::main`'s top-level
//! `Cli`/`Commands` split — one subcommand per façade operation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fathom", about = "Tiered web browsing with learned patterns")]
pub struct Cli {
    /// Directory to persist learned patterns and change predictions under.
    /// Omit to keep everything in memory for this process only.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON instead of a human-readable summary.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch one URL through the tiered cascade.
    Browse {
        url: String,
        /// Highest tier this request may escalate to: intelligence, lightweight, playwright.
        #[arg(long)]
        max_tier: Option<String>,
        #[arg(long)]
        session_profile: Option<String>,
    },
    /// Fetch many URLs concurrently.
    BatchBrowse {
        urls: Vec<String>,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        #[arg(long)]
        stop_on_error: bool,
    },
    /// Show what's known about a domain: pattern count, success rate,
    /// recommended wait strategy.
    DomainIntelligence { domain: String },
    /// Show aggregate registry/predictor/vector-store counts.
    Stats,
}
