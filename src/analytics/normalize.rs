//! Raw rows -> normalized observation table.
//!
//! Parses day-first dates, clamps negative counts to zero and sorts the table
//! chronologically. Negative counts come from reporting corrections; they are
//! clamped rather than dropped so later cumulative totals are not suppressed.

use chrono::NaiveDate;

use crate::domain::{DatasetStats, Observation, ObservationTable, RawObservation};
use crate::error::PipelineError;

/// Normalization output: the table plus what was clamped.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: ObservationTable,
    pub clamped_cases: usize,
    pub clamped_deaths: usize,
}

impl Normalized {
    pub fn stats(&self) -> DatasetStats {
        let (first_date, last_date) = match self.table.date_range() {
            Some((a, b)) => (Some(a), Some(b)),
            None => (None, None),
        };
        DatasetStats {
            rows: self.table.len(),
            regions: self.table.region_names().len(),
            first_date,
            last_date,
            clamped_cases: self.clamped_cases,
            clamped_deaths: self.clamped_deaths,
        }
    }
}

/// Normalize raw rows. Fails on the first unparseable date.
pub fn normalize(raw: Vec<RawObservation>) -> Result<Normalized, PipelineError> {
    let mut rows = Vec::with_capacity(raw.len());
    let mut clamped_cases = 0usize;
    let mut clamped_deaths = 0usize;

    for r in raw {
        let date = parse_date(&r.date).map_err(|msg| PipelineError::malformed_at(r.line, msg))?;
        if r.cases < 0 {
            clamped_cases += 1;
        }
        if r.deaths < 0 {
            clamped_deaths += 1;
        }
        rows.push(Observation {
            date,
            region_code: r.region_code,
            region_name: r.region_name,
            cases: clamp_count(r.cases),
            deaths: clamp_count(r.deaths),
            year: r.year,
            population: r.population,
        });
    }

    if clamped_cases + clamped_deaths > 0 {
        log::debug!("normalize: clamped {clamped_cases} negative case count(s), {clamped_deaths} negative death count(s)");
    }

    Ok(Normalized {
        table: ObservationTable::from_observations(rows),
        clamped_cases,
        clamped_deaths,
    })
}

/// `max(0, value)` as an unsigned count.
pub fn clamp_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Parse a day-first date.
///
/// The ECDC export uses `DD/MM/YYYY`; ISO dates are accepted as well.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];
    let s = s.trim();
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: DD/MM/YYYY, DD-MM-YYYY, DD.MM.YYYY, YYYY-MM-DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(line: usize, date: &str, region: &str, cases: i64, deaths: i64) -> RawObservation {
        RawObservation {
            line,
            date: date.to_string(),
            region_code: region[..2].to_uppercase(),
            region_name: region.to_string(),
            cases,
            deaths,
            year: 2021,
            population: 1_000_000,
        }
    }

    #[test]
    fn parses_day_first_dates() {
        let d = parse_date("03/02/2021").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 2, 3).unwrap());
        assert_eq!(parse_date("03-02-2021").unwrap(), d);
        assert_eq!(parse_date("2021-02-03").unwrap(), d);
        assert!(parse_date("2021/13/45").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn clamps_negative_counts_and_sorts() {
        let normalized = normalize(vec![
            raw(2, "03/01/2021", "France", 5, -2),
            raw(3, "01/01/2021", "France", -40, 1),
            raw(4, "02/01/2021", "France", 7, 0),
        ])
        .unwrap();

        let rows = normalized.table.rows();
        let dates: Vec<u32> = rows.iter().map(|r| chrono::Datelike::day(&r.date)).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert_eq!(rows[0].cases, 0);
        assert_eq!(rows[2].deaths, 0);
        assert_eq!(normalized.clamped_cases, 1);
        assert_eq!(normalized.clamped_deaths, 1);
    }

    #[test]
    fn renormalizing_is_a_no_op() {
        let normalized = normalize(vec![
            raw(2, "05/01/2021", "Spain", -1, 3),
            raw(3, "04/01/2021", "France", 9, -9),
            raw(4, "04/01/2021", "Spain", 2, 2),
        ])
        .unwrap();

        let again = ObservationTable::from_observations(normalized.table.rows().to_vec());
        assert_eq!(again, normalized.table);
        for r in again.rows() {
            // Counts are unsigned; re-clamping leaves them unchanged.
            assert_eq!(clamp_count(r.cases as i64), r.cases);
            assert_eq!(clamp_count(r.deaths as i64), r.deaths);
        }
    }

    #[test]
    fn bad_date_reports_line() {
        let err = normalize(vec![
            raw(2, "01/01/2021", "France", 1, 0),
            raw(3, "not-a-date", "France", 1, 0),
        ])
        .unwrap_err();
        match err {
            PipelineError::MalformedInput { line, .. } => assert_eq!(line, Some(3)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn stats_describe_table() {
        let normalized = normalize(vec![
            raw(2, "02/01/2021", "Spain", 1, 0),
            raw(3, "01/01/2021", "France", 1, 0),
        ])
        .unwrap();
        let stats = normalized.stats();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.regions, 2);
        assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2021, 1, 1));
        assert_eq!(stats.last_date, NaiveDate::from_ymd_opt(2021, 1, 2));
    }
}
