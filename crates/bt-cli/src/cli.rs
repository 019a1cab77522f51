//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Baby care timeline layout.
///
/// Reads care events (sleeps, feedings, night wakings, ...) from a JSON file
/// and computes where each one is drawn on a 24-hour timeline.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lay out a single day.
    Day(LayoutArgs),

    /// Lay out the Monday-based week containing a date.
    Week(LayoutArgs),

    /// Parse the input and report records that cannot be laid out.
    Check {
        /// JSON file with an array of events, or `-` for stdin.
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Arguments shared by the layout commands.
#[derive(Debug, Args)]
pub struct LayoutArgs {
    /// JSON file with an array of events, or `-` for stdin.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Day to render (YYYY-MM-DD).
    #[arg(short, long)]
    pub date: NaiveDate,

    /// Local time treated as "now" for sleeps still in progress
    /// (e.g. 2024-03-02T05:30:00). Defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,

    /// Output JSON instead of text.
    #[arg(long)]
    pub json: bool,
}
