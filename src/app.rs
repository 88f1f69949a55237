//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and `.env`
//! - sets up logging
//! - loads the dataset once
//! - runs the dashboard pipeline for the requested command
//! - prints reports/plots or writes exports

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, DataArgs, ExportArgs, SummaryArgs, TuiArgs};
use crate::domain::{DashboardConfig, Metric, RegionCatalog};
use crate::error::AppError;
use crate::io::ingest::load_dataset;

pub mod pipeline;

use pipeline::{ViewState, compute_view};

/// Environment variable naming the default CSV file.
pub const DATA_ENV_VAR: &str = "COVID_DATA";
/// CSV used when neither `-f` nor `COVID_DATA` is given.
pub const DEFAULT_DATA_FILE: &str = "data.csv";

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // We want `covid` and `covid -f data.csv` to behave like `covid tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let interactive = matches!(cli.command, Command::Tui(_));
    init_logging(cli.log_file.as_deref(), interactive)?;

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => handle_summary(args),
        Command::Export(args) => handle_export(args),
        Command::Regions(args) => handle_regions(args),
    }
}

/// Configure `env_logger`.
///
/// The TUI owns the terminal, so without a log file it stays silent unless
/// `RUST_LOG` asks otherwise.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<(), AppError> {
    let default_filter = if interactive && log_file.is_none() { "off" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| AppError::new(2, format!("Failed to create log file '{}': {e}", path.display())))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // A logger may already be installed (e.g. in tests); keep it.
    let _ = builder.try_init();
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let mut config = config_from_args(&args.data);
    config.show_raw = args.raw;
    crate::tui::run(config)
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    let mut config = config_from_args(&args.data);
    config.tail = args.tail;
    config.plot = args.plot;
    config.show_raw = args.raw;
    config.plot_width = args.width;
    config.plot_height = args.height;

    let dataset = load_dataset(&config.csv_path)?;
    let catalog = RegionCatalog::standard();
    catalog.validate(&dataset.table)?;

    let mut state = ViewState::for_region(&catalog, config.region.as_deref());
    state.show_raw = config.show_raw;
    let view = compute_view(&dataset, &catalog, &state);

    println!("{}", crate::report::format_dataset_summary(&dataset));
    if view.show_raw {
        println!("{}", crate::report::format_raw_table(&dataset.table, config.tail));
    }

    println!("--- World ---");
    print!("{}", crate::report::format_series_headline(&view.world));
    println!("{}", crate::report::format_series_table(&view.world, config.tail));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_cumulative_plot(&view.world, config.plot_width, config.plot_height)
        );
        println!(
            "{}",
            crate::plot::render_daily_plot(&view.world, Metric::Cases, config.plot_width, config.plot_height)
        );
    }

    println!("--- Region: {} ---", state.label(&catalog));
    match &view.region {
        Ok(series) => {
            print!("{}", crate::report::format_series_headline(series));
            println!("{}", crate::report::format_series_table(series, config.tail));
            if config.plot {
                for metric in [Metric::Cases, Metric::Deaths] {
                    println!(
                        "{}",
                        crate::plot::render_daily_plot(series, metric, config.plot_width, config.plot_height)
                    );
                }
            }
        }
        Err(err) => println!("{err}\n"),
    }

    println!("{}", crate::report::format_growth(&view.growth));
    println!("{}", crate::report::GROWTH_CAPTION);
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.data);
    let dataset = load_dataset(&config.csv_path)?;
    let catalog = RegionCatalog::standard();

    let state = ViewState::for_region(&catalog, config.region.as_deref());
    let view = compute_view(&dataset, &catalog, &state);
    let series = view.region?;

    crate::io::export::write_series(&args.out, args.format, &series, &view.growth, &dataset.source)?;
    println!("Wrote {} point(s) to {}", series.len(), args.out.display());
    Ok(())
}

fn handle_regions(args: DataArgs) -> Result<(), AppError> {
    let config = config_from_args(&args);
    let dataset = load_dataset(&config.csv_path)?;
    let catalog = RegionCatalog::standard();
    print!("{}", crate::report::format_region_list(&catalog, &dataset.table));
    Ok(())
}

/// Resolve shared options into a config, reading `.env` for defaults.
pub fn config_from_args(args: &DataArgs) -> DashboardConfig {
    DashboardConfig {
        csv_path: resolve_csv_path(args.file.as_deref()),
        region: args.region.clone(),
        show_raw: false,
        tail: 14,
        plot: false,
        plot_width: 100,
        plot_height: 20,
    }
}

fn resolve_csv_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    dotenvy::dotenv().ok();
    std::env::var_os(DATA_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Rewrite argv so `covid` defaults to `covid tui`.
///
/// Rules:
/// - `covid`                     -> `covid tui`
/// - `covid -f data.csv ...`     -> `covid tui -f data.csv ...`
/// - `covid --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "summary" | "export" | "regions");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
