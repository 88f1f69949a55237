//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the aggregation pipeline
//! - exported to JSON/CSV
//! - rendered by the terminal front-ends

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A CSV row as read from disk, before normalization.
///
/// Dates are still strings and counts may be negative (reporting corrections).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    /// 1-based CSV line, used in error messages.
    pub line: usize,
    pub date: String,
    pub region_code: String,
    pub region_name: String,
    pub cases: i64,
    pub deaths: i64,
    pub year: i32,
    pub population: u64,
}

/// One normalized (date, region) observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub region_code: String,
    pub region_name: String,
    pub cases: u64,
    pub deaths: u64,
    pub year: i32,
    pub population: u64,
}

/// The normalized observation table, sorted ascending by date.
///
/// Constructed once per session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    /// Build a table from already-clamped observations.
    ///
    /// The sort is stable, so rows sharing a date keep their input order and
    /// rebuilding a table from its own rows gives the same table back.
    pub fn from_observations(mut rows: Vec<Observation>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self { rows }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct region names, sorted.
    pub fn region_names(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|r| r.region_name.as_str()).collect()
    }

    /// Whether any row matches `key` by region name or code.
    pub fn contains_region(&self, key: &str) -> bool {
        self.rows.iter().any(|r| r.region_name == key || r.region_code == key)
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?.date;
        let last = self.rows.last()?.date;
        Some((first, last))
    }
}

/// Which records an aggregated series is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionFilter {
    /// All regions summed per date.
    All,
    /// A single region, matched by region name or region code.
    Region(String),
}

impl RegionFilter {
    pub fn matches(&self, obs: &Observation) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Region(key) => obs.region_name == *key || obs.region_code == *key,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, RegionFilter::All)
    }

    /// Label used in reports and chart titles.
    pub fn label(&self) -> &str {
        match self {
            RegionFilter::All => "all regions",
            RegionFilter::Region(key) => key,
        }
    }
}

/// One per-date point of an aggregated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub total_cases: u64,
    pub total_deaths: u64,
    pub cumulative_cases: u64,
    pub cumulative_deaths: u64,
    /// Trailing 7-point mean; `None` for the first 6 points.
    pub rolling_cases_7d: Option<f64>,
    pub rolling_deaths_7d: Option<f64>,
}

/// Per-date series derived from the observation table for one filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries {
    pub filter: RegionFilter,
    pub points: Vec<SeriesPoint>,
}

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }
}

/// Which daily count a chart or table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    pub fn display_name(self) -> &'static str {
        match self {
            Metric::Cases => "new cases",
            Metric::Deaths => "deaths",
        }
    }

    pub fn daily(self, p: &SeriesPoint) -> u64 {
        match self {
            Metric::Cases => p.total_cases,
            Metric::Deaths => p.total_deaths,
        }
    }

    pub fn rolling(self, p: &SeriesPoint) -> Option<f64> {
        match self {
            Metric::Cases => p.rolling_cases_7d,
            Metric::Deaths => p.rolling_deaths_7d,
        }
    }
}

/// Growth rate of the 7-day average over the last 30 points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRate {
    pub value: f64,
    pub latest_date: NaiveDate,
    pub latest_avg: f64,
    pub prior_date: NaiveDate,
    pub prior_avg: f64,
}

/// Reading of a growth rate for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Accelerating,
    Decelerating,
    Stable,
}

impl GrowthRate {
    pub fn trend(&self) -> Trend {
        if self.value > 1.0 {
            Trend::Accelerating
        } else if self.value < 1.0 {
            Trend::Decelerating
        } else {
            Trend::Stable
        }
    }
}

impl Trend {
    pub fn display_name(self) -> &'static str {
        match self {
            Trend::Accelerating => "accelerating",
            Trend::Decelerating => "slowing down",
            Trend::Stable => "stable",
        }
    }
}

/// Summary stats about the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStats {
    pub rows: usize,
    pub regions: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Rows whose `cases` were negative and clamped to zero.
    pub clamped_cases: usize,
    /// Rows whose `deaths` were negative and clamped to zero.
    pub clamped_deaths: usize,
}

/// Output format for `covid export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// A full run's configuration as understood by the front-ends.
///
/// This is derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub csv_path: PathBuf,
    /// Region selector input (display name, dataset name/code, or the sentinel).
    pub region: Option<String>,
    /// Show the raw normalized table.
    pub show_raw: bool,
    /// Number of trailing points printed by `summary`.
    pub tail: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}
