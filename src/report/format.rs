//! Formatted terminal output: dataset summary, series tables, growth rate.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{AggregatedSeries, GrowthRate, ObservationTable, RegionCatalog, SeriesPoint};
use crate::error::PipelineError;
use crate::io::ingest::Dataset;

/// Where the dataset comes from.
pub const DATA_SOURCE_URL: &str =
    "https://www.ecdc.europa.eu/en/publications-data/data-daily-new-cases-covid-19-eueea-country";

/// How to read the growth rate.
pub const GROWTH_CAPTION: &str = "Compares the 7-day case average on the latest date with the one 30 days earlier. \
Above 1 the epidemic has grown; below 1 the wave has slowed down.";

/// Format the dataset header (source, size, date range, clamping).
pub fn format_dataset_summary(dataset: &Dataset) -> String {
    let stats = &dataset.stats;
    let mut out = String::new();

    out.push_str("=== covid - Covid-19 dashboard ===\n");
    out.push_str(&format!("Data: {}\n", dataset.source.display()));
    out.push_str(&format!("Source: {DATA_SOURCE_URL}\n"));
    let range = match (stats.first_date, stats.last_date) {
        (Some(a), Some(b)) => format!("{a} .. {b}"),
        _ => "-".to_string(),
    };
    out.push_str(&format!(
        "Rows: n={} | regions={} | dates={range}\n",
        stats.rows, stats.regions
    ));
    if stats.clamped_cases + stats.clamped_deaths > 0 {
        out.push_str(&format!(
            "Clamped negative counts: cases={} deaths={}\n",
            stats.clamped_cases, stats.clamped_deaths
        ));
    }

    out
}

/// Headline numbers for a series: latest point and totals.
pub fn format_series_headline(series: &AggregatedSeries) -> String {
    let Some(last) = series.last() else {
        return format!("{}: no data\n", series.filter.label());
    };
    format!(
        "{}: {} point(s) | latest {} | new cases {} (7d avg {}) | deaths {} (7d avg {}) | cumulative cases {}\n",
        series.filter.label(),
        series.len(),
        last.date,
        last.total_cases,
        fmt_avg(last.rolling_cases_7d),
        last.total_deaths,
        fmt_avg(last.rolling_deaths_7d),
        last.cumulative_cases,
    )
}

/// Format the last `tail` points of a series as a table.
pub fn format_series_table(series: &AggregatedSeries, tail: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>10} {:>10} {:>8} {:>10} {:>14}\n",
            "date", "cases", "avg7", "deaths", "avg7", "cumulative"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<10} {:-<10} {:-<8} {:-<10} {:-<14}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    let start = series.len().saturating_sub(tail);
    for p in &series.points[start..] {
        out.push_str(&format_point(p));
        out.push('\n');
    }

    out
}

fn format_point(p: &SeriesPoint) -> String {
    format!(
        "{:<10} {:>10} {:>10} {:>8} {:>10} {:>14}",
        p.date.format("%Y-%m-%d"),
        p.total_cases,
        fmt_avg(p.rolling_cases_7d),
        p.total_deaths,
        fmt_avg(p.rolling_deaths_7d),
        p.cumulative_cases,
    )
}

/// Format the growth-rate metric, or why it is not available.
pub fn format_growth(growth: &Result<GrowthRate, PipelineError>) -> String {
    match growth {
        Ok(rate) => format!(
            "Monthly growth rate: {:.3} ({}) | 7d avg {:.1} on {} vs {:.1} on {}",
            rate.value,
            rate.trend().display_name(),
            rate.latest_avg,
            rate.latest_date,
            rate.prior_avg,
            rate.prior_date,
        ),
        Err(err) => format!("Monthly growth rate: not available ({err})"),
    }
}

/// Format the normalized table (first `limit` rows).
///
/// Year and population are plain integers (no thousands separators).
pub fn format_raw_table(table: &ObservationTable, limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:<24} {:<6} {:>8} {:>8} {:>6} {:>12}\n",
            "date", "region", "code", "cases", "deaths", "year", "population"
        )
        .trim_end(),
    );
    out.push('\n');

    for r in table.rows().iter().take(limit) {
        out.push_str(
            format!(
                "{:<10} {:<24} {:<6} {:>8} {:>8} {:>6} {:>12}",
                r.date.format("%Y-%m-%d"),
                truncate(&r.region_name, 24),
                truncate(&r.region_code, 6),
                r.cases,
                r.deaths,
                r.year,
                r.population,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if table.len() > limit {
        out.push_str(&format!("... {} more row(s)\n", table.len() - limit));
    }

    out
}

/// List selector options and whether each has data.
pub fn format_region_list(catalog: &RegionCatalog, table: &ObservationTable) -> String {
    let mut out = String::new();
    for opt in catalog.options() {
        let status = match &opt.filter {
            crate::domain::RegionFilter::All => "all regions".to_string(),
            crate::domain::RegionFilter::Region(name) => {
                let n = table.rows().iter().filter(|r| opt.filter.matches(r)).count();
                if n == 0 {
                    format!("{name} (missing)")
                } else {
                    format!("{name} ({n} rows)")
                }
            }
        };
        out.push_str(&format!("{:<16} {status}\n", opt.label));
    }
    out
}

pub fn fmt_avg(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.1}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
