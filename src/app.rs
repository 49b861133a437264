//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env` settings
//! - installs logging
//! - runs the load/forecast pipeline
//! - prints reports/plots
//! - writes the export CSV

use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, RunArgs, SeriesArgs};
use crate::data::{SeriesSource, WorldBankClient};
use crate::domain::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, RunConfig, SeriesIdentity};
use crate::error::AppError;

pub mod pipeline;
pub mod stage;

/// Entry point for the `wbf` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `wbf -c AFG -i X` behaves like `wbf run -c AFG -i X`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Probe(args) => handle_probe(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, env_var)?;
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run, chrono::Local::now()));
    println!("{}", crate::report::format_forecast_table(&run.export, args.tail));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.display, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if config.export {
        println!("Exported: {}", config.resolved_export_path().display());
    }

    Ok(())
}

fn handle_probe(args: SeriesArgs) -> Result<(), AppError> {
    let identity = SeriesIdentity::new(&args.country, &args.indicator)?;
    let (base_url, timeout_secs) = endpoint_from_args(&args, env_var)?;
    let client = WorldBankClient::new(base_url, Duration::from_secs(timeout_secs))?;
    client.probe(&identity)?;
    info!(%identity, "reachable");
    println!("OK: {identity} is available at {}", client.series_url(&identity));
    Ok(())
}

fn handle_tui(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, env_var)?;
    crate::tui::run(config)
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Resolve base URL and timeout: CLI flag, then environment, then defaults.
fn endpoint_from_args(
    args: &SeriesArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(String, u64), AppError> {
    let base_url = args
        .base_url
        .clone()
        .or_else(|| env("WB_BASE_URL"))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout_secs = match (args.timeout, env("WB_TIMEOUT_SECS")) {
        (Some(t), _) => t,
        (None, Some(raw)) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::config(format!("Invalid WB_TIMEOUT_SECS '{raw}'.")))?,
        (None, None) => DEFAULT_TIMEOUT_SECS,
    };
    if timeout_secs == 0 {
        return Err(AppError::config("Timeout must be > 0 seconds."));
    }

    Ok((base_url, timeout_secs))
}

pub fn run_config_from_args(
    args: &RunArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RunConfig, AppError> {
    if args.horizon == 0 {
        return Err(AppError::config("Horizon must be > 0."));
    }
    let identity = SeriesIdentity::new(&args.series.country, &args.series.indicator)?;
    let (base_url, timeout_secs) = endpoint_from_args(&args.series, env)?;

    Ok(RunConfig {
        identity,
        horizon: args.horizon,
        base_url,
        timeout_secs,
        export: !args.no_export,
        export_path: args.export.clone(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
    })
}

/// Rewrite argv so flags without a subcommand mean `run`.
///
/// Rules:
/// - `wbf -c AFG -i X ...`     -> `wbf run -c AFG -i X ...`
/// - `wbf --help/--version/-h` -> unchanged (show top-level help/version)
/// - `wbf -v run ...`          -> unchanged (global flag before a subcommand)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let has_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "run" | "probe" | "tui"));
    if has_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
