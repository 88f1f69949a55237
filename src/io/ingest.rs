//! CSV ingest.
//!
//! This module is responsible for turning the ECDC daily-cases CSV into the
//! immutable [`Dataset`] every view is computed from.
//!
//! Design goals:
//! - **Strict schema** for required columns (missing column = fatal, exit code 2)
//! - **Fatal row errors**: a half-loaded table would silently skew every sum
//! - **Load once**: the dataset is shared read-only across interactions

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::StringRecord;

use crate::analytics::normalize;
use crate::domain::{DatasetStats, ObservationTable, RawObservation};
use crate::error::{AppError, PipelineError};

pub const COL_DATE: &str = "dateRep";
pub const COL_CASES: &str = "cases";
pub const COL_DEATHS: &str = "deaths";
pub const COL_REGION: &str = "countriesAndTerritories";
pub const COL_YEAR: &str = "year";
pub const COL_POPULATION: &str = "popData2020";
/// Optional short region code.
pub const COL_REGION_CODE: &str = "geoId";

pub const REQUIRED_COLUMNS: [&str; 6] = [COL_DATE, COL_CASES, COL_DEATHS, COL_REGION, COL_YEAR, COL_POPULATION];

/// The loaded, normalized dataset.
///
/// Cloning is cheap: the table is behind an `Arc` and never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub table: Arc<ObservationTable>,
    pub stats: DatasetStats,
}

/// Load and normalize the CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let dataset = read_dataset(file, path.to_path_buf())?;
    log::info!(
        "loaded {} row(s), {} region(s) from {}",
        dataset.stats.rows,
        dataset.stats.regions,
        path.display()
    );
    Ok(dataset)
}

/// Read and normalize a CSV from any reader.
pub fn read_dataset<R: Read>(reader: R, source: PathBuf) -> Result<Dataset, PipelineError> {
    let raw = read_raw_observations(reader)?;
    let normalized = normalize(raw)?;
    let stats = normalized.stats();
    Ok(Dataset {
        source,
        table: Arc::new(normalized.table),
        stats,
    })
}

/// Read raw rows without normalizing them.
pub fn read_raw_observations<R: Read>(reader: R) -> Result<Vec<RawObservation>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::malformed(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| PipelineError::malformed_at(line, format!("CSV parse error: {e}")))?;
        let row = parse_row(&record, &header_map, line).map_err(|msg| PipelineError::malformed_at(line, msg))?;
        rows.push(row);
    }

    Ok(rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), PipelineError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header_map.contains_key(&c.to_ascii_lowercase()))
        .copied()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(PipelineError::malformed(format!(
        "Missing required column(s): {}",
        missing.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", ")
    )))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>, line: usize) -> Result<RawObservation, String> {
    let date = get_required(record, header_map, COL_DATE)?.to_string();
    let region_name = get_required(record, header_map, COL_REGION)?.to_string();
    let region_code = get_optional(record, header_map, COL_REGION_CODE)
        .map(str::to_string)
        .unwrap_or_else(|| region_name.clone());

    let cases = parse_count(get_present(record, header_map, COL_CASES)?, COL_CASES)?;
    let deaths = parse_count(get_present(record, header_map, COL_DEATHS)?, COL_DEATHS)?;
    let year = parse_count(get_present(record, header_map, COL_YEAR)?, COL_YEAR)?;
    let population = parse_count(get_present(record, header_map, COL_POPULATION)?, COL_POPULATION)?;

    let year = i32::try_from(year).map_err(|_| format!("`{COL_YEAR}` out of range: {year}"))?;
    let population =
        u64::try_from(population).map_err(|_| format!("`{COL_POPULATION}` must not be negative: {population}"))?;

    Ok(RawObservation {
        line,
        date,
        region_code,
        region_name,
        cases,
        deaths,
        year,
        population,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// A required column whose cell may be blank (`Ok(None)`). A row too short
/// to contain the column is an error, not a blank.
fn get_present<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<Option<&'a str>, String> {
    let idx = header_map
        .get(&name.to_ascii_lowercase())
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    let cell = record
        .get(*idx)
        .ok_or_else(|| format!("Row has {} field(s); `{name}` is missing", record.len()))?;
    let cell = cell.trim();
    Ok((!cell.is_empty()).then_some(cell))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(&name.to_ascii_lowercase())?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse an integer cell. Blank cells read as 0; `12.0` is accepted.
fn parse_count(s: Option<&str>, name: &str) -> Result<i64, String> {
    let Some(s) = s else { return Ok(0) };
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("Invalid integer in `{name}`: '{s}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
dateRep,day,month,year,cases,deaths,countriesAndTerritories,geoId,countryterritoryCode,popData2020,continentExp
02/01/2021,2,1,2021,120,3,France,FR,FRA,67320216,Europe
01/01/2021,1,1,2021,-5,1,France,FR,FRA,67320216,Europe
01/01/2021,1,1,2021,40,,Malta,MT,MLT,514564,Europe
";

    #[test]
    fn reads_and_normalizes_sample() {
        let ds = read_dataset(SAMPLE.as_bytes(), PathBuf::from("sample.csv")).unwrap();
        let rows = ds.table.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(rows[0].region_name, "France");
        assert_eq!(rows[0].cases, 0);
        assert_eq!(rows[1].region_code, "MT");
        assert_eq!(rows[1].deaths, 0);
        assert_eq!(rows[2].cases, 120);
        assert_eq!(rows[2].population, 67_320_216);
        assert_eq!(ds.stats.regions, 2);
        assert_eq!(ds.stats.clamped_cases, 1);
    }

    #[test]
    fn header_match_is_case_insensitive_and_strips_bom() {
        let csv = "\u{feff}DATEREP,Cases,Deaths,countriesandterritories,Year,POPDATA2020\n01/01/2021,1,0,Spain,2021,47000000\n";
        let rows = read_raw_observations(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].region_code, "Spain");
    }

    #[test]
    fn missing_column_is_malformed() {
        let csv = "dateRep,cases,countriesAndTerritories,year,popData2020\n01/01/2021,1,Spain,2021,1\n";
        let err = read_raw_observations(csv.as_bytes()).unwrap_err();
        match err {
            PipelineError::MalformedInput { line: None, message } => assert!(message.contains("`deaths`")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_malformed() {
        let csv = "dateRep,cases,deaths,countriesAndTerritories,year,popData2020\n31/02/2021,1,0,Spain,2021,1\n";
        let err = read_dataset(csv.as_bytes(), PathBuf::from("x.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { line: Some(2), .. }));
    }

    #[test]
    fn bad_integer_is_malformed() {
        let csv = "dateRep,cases,deaths,countriesAndTerritories,year,popData2020\n01/02/2021,lots,0,Spain,2021,1\n";
        let err = read_raw_observations(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput { line: Some(2), .. }));
    }

    #[test]
    fn truncated_row_is_malformed() {
        let csv = "dateRep,countriesAndTerritories,cases,deaths,year,popData2020\n01/01/2021,France,5\n";
        let err = read_raw_observations(csv.as_bytes()).unwrap_err();
        match err {
            PipelineError::MalformedInput { line: Some(2), message } => assert!(message.contains("`deaths`")),
            other => panic!("unexpected error: {other:?}"),
        }

        // Present but blank cells still read as 0.
        let csv = "dateRep,countriesAndTerritories,cases,deaths,year,popData2020\n01/01/2021,France,5,,,\n";
        let rows = read_raw_observations(csv.as_bytes()).unwrap();
        assert_eq!((rows[0].cases, rows[0].deaths, rows[0].population), (5, 0, 0));
    }

    #[test]
    fn parse_count_accepts_integral_floats() {
        assert_eq!(parse_count(Some("12.0"), "cases"), Ok(12));
        assert_eq!(parse_count(None, "cases"), Ok(0));
        assert!(parse_count(Some("1.5"), "cases").is_err());
    }

    #[test]
    fn loading_twice_is_identical() {
        let a = read_dataset(SAMPLE.as_bytes(), PathBuf::from("a.csv")).unwrap();
        let b = read_dataset(SAMPLE.as_bytes(), PathBuf::from("a.csv")).unwrap();
        assert_eq!(a.table, b.table);
        assert_eq!(a.stats, b.stats);
    }
}
