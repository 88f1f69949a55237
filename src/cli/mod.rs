//! Command-line parsing for the Covid-19 dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ExportFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "Covid-19 dashboard (ECDC daily cases per country)")]
pub struct Cli {
    /// Write log output to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    ///
    /// Renders world and per-country charts in a terminal UI using Ratatui.
    Tui(TuiArgs),
    /// Print world and region summaries, the growth rate, and optional plots.
    Summary(SummaryArgs),
    /// Write an aggregated series to CSV or JSON.
    Export(ExportArgs),
    /// List region selector options and whether the dataset covers them.
    Regions(DataArgs),
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// CSV file (defaults to $COVID_DATA, then `data.csv`).
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Initial region: French display name, dataset name/code, or `all`.
    #[arg(short = 'r', long)]
    pub region: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Start with the raw data table shown instead of the charts.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of trailing dates shown in the tables.
    #[arg(long, default_value_t = 14)]
    pub tail: usize,

    /// Render ASCII plots (cumulative, new cases, deaths).
    #[arg(long)]
    pub plot: bool,

    /// Also print the first rows of the normalized table.
    #[arg(long)]
    pub raw: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Output path.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_flags() {
        let cli = Cli::parse_from(["covid", "summary", "-f", "x.csv", "-r", "France", "--plot", "--tail", "3"]);
        match cli.command {
            Command::Summary(args) => {
                assert_eq!(args.data.file, Some(PathBuf::from("x.csv")));
                assert_eq!(args.data.region.as_deref(), Some("France"));
                assert!(args.plot);
                assert!(!args.raw);
                assert_eq!(args.tail, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_tui_raw_flag() {
        let cli = Cli::parse_from(["covid", "tui", "--raw", "-r", "Malte"]);
        match cli.command {
            Command::Tui(args) => {
                assert!(args.raw);
                assert_eq!(args.data.region.as_deref(), Some("Malte"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_export_format() {
        let cli = Cli::parse_from(["covid", "export", "-o", "out.json", "--format", "json", "--log-file", "l.log"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("l.log")));
        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.format, ExportFormat::Json);
                assert_eq!(args.out, PathBuf::from("out.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
