//! Command-line parsing for the World Bank series forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::DEFAULT_HORIZON;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wbf", version, about = "World Bank indicator forecaster")]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a series, forecast it, print a summary/plot, and export CSV.
    Run(RunArgs),
    /// Check that the endpoint answers for a country/indicator pair.
    Probe(SeriesArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same pipeline as `wbf run`, but renders results with Ratatui.
    Tui(RunArgs),
}

/// Which series to address, and where.
#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// ISO country code (e.g. AFG, USA). Case-insensitive.
    #[arg(short = 'c', long)]
    pub country: String,

    /// Indicator code (e.g. NY.GDP.MKTP.CN). Case-insensitive.
    #[arg(short = 'i', long)]
    pub indicator: String,

    /// API base URL. Defaults to WB_BASE_URL or the public endpoint.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds. Defaults to WB_TIMEOUT_SECS or 30.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Options for a full run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Number of future periods to forecast.
    #[arg(short = 'n', long, default_value_t = DEFAULT_HORIZON)]
    pub horizon: usize,

    /// Export CSV path (default: Forecast_{country}_{indicator}.csv).
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Skip writing the export CSV.
    #[arg(long)]
    pub no_export: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// History rows shown above the forecast table.
    #[arg(long, default_value_t = 5)]
    pub tail: usize,
}
