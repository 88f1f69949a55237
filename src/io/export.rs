//! Export aggregated series to CSV or JSON.
//!
//! The CSV export is meant to be easy to consume in spreadsheets; the JSON
//! export also carries the growth rate and the dataset it came from.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{AggregatedSeries, ExportFormat, GrowthRate, SeriesPoint};
use crate::error::{AppError, PipelineError};

/// One exported CSV row (flat, spreadsheet-friendly).
#[derive(Debug, Serialize)]
struct SeriesRow<'a> {
    date: NaiveDate,
    region: &'a str,
    cases: u64,
    deaths: u64,
    cumulative_cases: u64,
    cumulative_deaths: u64,
    rolling_cases_7d: Option<f64>,
    rolling_deaths_7d: Option<f64>,
}

/// JSON export document.
#[derive(Debug, Serialize)]
pub struct SeriesFile<'a> {
    pub tool: &'static str,
    pub source: String,
    pub region: &'a str,
    /// `None` when the growth rate is not available; see `growth_rate_note`.
    pub growth_rate: Option<GrowthRate>,
    pub growth_rate_note: Option<String>,
    pub points: &'a [SeriesPoint],
}

/// Write `series` to `path` in the requested format.
pub fn write_series(
    path: &Path,
    format: ExportFormat,
    series: &AggregatedSeries,
    growth: &Result<GrowthRate, PipelineError>,
    source: &Path,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export file '{}': {e}", path.display())))?;

    match format {
        ExportFormat::Csv => write_series_csv(file, series),
        ExportFormat::Json => {
            let doc = SeriesFile {
                tool: "covid",
                source: source.display().to_string(),
                region: series.filter.label(),
                growth_rate: growth.as_ref().ok().copied(),
                growth_rate_note: growth.as_ref().err().map(|e| e.to_string()),
                points: &series.points,
            };
            write_series_json(file, &doc)
        }
    }?;

    log::info!("exported {} point(s) to {}", series.len(), path.display());
    Ok(())
}

/// Write the series as CSV.
pub fn write_series_csv<W: Write>(out: W, series: &AggregatedSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    let region = series.filter.label();
    for p in &series.points {
        writer
            .serialize(SeriesRow {
                date: p.date,
                region,
                cases: p.total_cases,
                deaths: p.total_deaths,
                cumulative_cases: p.cumulative_cases,
                cumulative_deaths: p.cumulative_deaths,
                rolling_cases_7d: p.rolling_cases_7d,
                rolling_deaths_7d: p.rolling_deaths_7d,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the series as pretty-printed JSON.
pub fn write_series_json<W: Write>(out: W, doc: &SeriesFile<'_>) -> Result<(), AppError> {
    serde_json::to_writer_pretty(out, doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegionFilter;

    fn series() -> AggregatedSeries {
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        AggregatedSeries {
            filter: RegionFilter::Region("France".to_string()),
            points: vec![SeriesPoint {
                date,
                total_cases: 10,
                total_deaths: 1,
                cumulative_cases: 10,
                cumulative_deaths: 1,
                rolling_cases_7d: None,
                rolling_deaths_7d: Some(2.5),
            }],
        }
    }

    #[test]
    fn csv_export_has_header_and_blank_missing_averages() {
        let mut buf = Vec::new();
        write_series_csv(&mut buf, &series()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,region,cases,deaths,cumulative_cases,cumulative_deaths,rolling_cases_7d,rolling_deaths_7d")
        );
        assert_eq!(lines.next(), Some("2021-01-01,France,10,1,10,1,,2.5"));
    }

    #[test]
    fn json_export_carries_growth_note() {
        let s = series();
        let err = PipelineError::InsufficientHistory { points: 1, required: 31 };
        let doc = SeriesFile {
            tool: "covid",
            source: "data.csv".to_string(),
            region: s.filter.label(),
            growth_rate: None,
            growth_rate_note: Some(err.to_string()),
            points: &s.points,
        };
        let mut buf = Vec::new();
        write_series_json(&mut buf, &doc).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["region"], "France");
        assert!(value["growth_rate"].is_null());
        assert_eq!(value["points"][0]["cumulative_cases"], 10);
        assert!(value["growth_rate_note"].as_str().unwrap().contains("Not enough history"));
    }
}
