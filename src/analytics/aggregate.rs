//! Observation table -> per-date aggregated series.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analytics::rolling::{ROLLING_WINDOW, cumulative, trailing_mean};
use crate::domain::{AggregatedSeries, ObservationTable, RegionFilter, SeriesPoint};
use crate::error::PipelineError;

/// Build the aggregated series for `filter`.
///
/// - `All` sums cases/deaths per date across regions; an empty table gives an
///   empty series.
/// - `Region(key)` takes the matching rows as-is (one per date in the source
///   data); no matching row is `UnknownRegion`.
pub fn aggregate(table: &ObservationTable, filter: &RegionFilter) -> Result<AggregatedSeries, PipelineError> {
    let daily = match filter {
        RegionFilter::All => sum_by_date(table),
        RegionFilter::Region(key) => {
            let mut rows: Vec<(NaiveDate, u64, u64)> = table
                .rows()
                .iter()
                .filter(|r| filter.matches(r))
                .map(|r| (r.date, r.cases, r.deaths))
                .collect();
            if rows.is_empty() {
                return Err(PipelineError::UnknownRegion(key.clone()));
            }
            rows.sort_by_key(|(date, _, _)| *date);
            rows
        }
    };

    Ok(AggregatedSeries {
        filter: filter.clone(),
        points: build_points(&daily),
    })
}

fn sum_by_date(table: &ObservationTable) -> Vec<(NaiveDate, u64, u64)> {
    let mut by_date: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for r in table.rows() {
        let entry = by_date.entry(r.date).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(r.cases);
        entry.1 = entry.1.saturating_add(r.deaths);
    }
    by_date
        .into_iter()
        .map(|(date, (cases, deaths))| (date, cases, deaths))
        .collect()
}

fn build_points(daily: &[(NaiveDate, u64, u64)]) -> Vec<SeriesPoint> {
    let cases: Vec<u64> = daily.iter().map(|d| d.1).collect();
    let deaths: Vec<u64> = daily.iter().map(|d| d.2).collect();

    let cum_cases = cumulative(&cases);
    let cum_deaths = cumulative(&deaths);
    let avg_cases = trailing_mean(&cases, ROLLING_WINDOW);
    let avg_deaths = trailing_mean(&deaths, ROLLING_WINDOW);

    daily
        .iter()
        .enumerate()
        .map(|(i, &(date, total_cases, total_deaths))| SeriesPoint {
            date,
            total_cases,
            total_deaths,
            cumulative_cases: cum_cases[i],
            cumulative_deaths: cum_deaths[i],
            rolling_cases_7d: avg_cases[i],
            rolling_deaths_7d: avg_deaths[i],
        })
        .collect()
}
