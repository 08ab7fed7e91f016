mod errors;

use std::fs::File;
use std::io::Read;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
pub use crate::manager_cimis::errors::CimisError;
use crate::config::Columns;
use crate::models::observation::Observation;

/// Date layouts seen in CIMIS daily exports, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Cell values that mean "no reading"
const NA_VALUES: [&str; 10] = ["", "NA", "N/A", "NaN", "nan", "-nan", "null", "NULL", "#N/A", "n/a"];

/// Struct for reading daily station observations from a CIMIS style csv export
pub struct Cimis {
    path: String,
    columns: Columns,
}

impl Cimis {
    /// Returns a Cimis struct ready to read observations
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the csv file
    /// * 'columns' - header names of the date, temperature and station columns
    pub fn new(path: &str, columns: &Columns) -> Cimis {
        Cimis { path: path.to_string(), columns: columns.clone() }
    }

    /// Reads all observations in the file.
    ///
    /// Missing temperatures are kept as None so that a day where no station reported
    /// still counts when finding the latest date.
    pub fn read_observations(&self) -> Result<Vec<Observation>, CimisError> {
        let file = File::open(&self.path)
            .map_err(|e| CimisError(format!("can't open {}: {}", self.path, e)))?;
        let observations = read_from(file, &self.columns)?;

        info!("read {} observations from {}", observations.len(), self.path);
        Ok(observations)
    }
}

/// Reads observations from any csv source with a header row
///
/// # Arguments
///
/// * 'source' - the csv data
/// * 'columns' - header names to look for
pub fn read_from<R: Read>(source: R, columns: &Columns) -> Result<Vec<Observation>, CimisError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let date_idx = column_index(&headers, &columns.date)
        .ok_or_else(|| CimisError(format!("column '{}' not found", columns.date)))?;
    let temp_idx = column_index(&headers, &columns.temperature)
        .ok_or_else(|| CimisError(format!("column '{}' not found", columns.temperature)))?;
    let station_idx = column_index(&headers, &columns.station);
    if station_idx.is_none() {
        debug!("no '{}' column, station ids not available", columns.station);
    }

    let mut observations = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());

        let date_cell = record.get(date_idx).unwrap_or("");
        if date_cell.is_empty() {
            debug!("line {}: no date, row skipped", line);
            continue;
        }
        let date = parse_date(date_cell)
            .ok_or_else(|| CimisError(format!("line {}: unparsable date '{}'", line, date_cell)))?;
        let temperature = parse_temperature(record.get(temp_idx).unwrap_or(""))
            .map_err(|v| CimisError(format!("line {}: non-numeric temperature '{}'", line, v)))?;
        let station = station_idx
            .and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        observations.push(Observation { date, station, temperature });
    }

    Ok(observations)
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Parses a date in any of the accepted layouts
///
/// # Arguments
///
/// * 'value' - the date cell
fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
}

/// Parses a temperature cell, NA markers give None and anything else non-numeric
/// is returned as the error value
///
/// # Arguments
///
/// * 'value' - the temperature cell
fn parse_temperature(value: &str) -> Result<Option<f64>, String> {
    if NA_VALUES.contains(&value) {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(value.to_string()),
    }
}
