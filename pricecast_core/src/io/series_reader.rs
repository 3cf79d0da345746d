use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::common::{
    forecast_error::{ForecastError, ForecastResult},
    time::{excel_serial_to_date, parse_date},
};
use crate::series::observed_point::{RawPoint, RawSeries};

const MISSING_MARKERS: [&str; 6] = ["", "nan", "na", "n/a", "null", "none"];

/// Which columns hold the dates and the prices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    pub date_column: String,
    /// `None` picks the first column that is not the date column
    pub value_column: Option<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            date_column: "dt".to_string(),
            value_column: None,
        }
    }
}

/// Read a date/price table from a CSV file or the first sheet of a workbook.
/// Rows come back sorted by date.
pub fn read_series(path: impl AsRef<Path>, opts: &ReadOptions) -> ForecastResult<RawSeries> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    let mut series = match ext.as_str() {
        "csv" | "txt" => read_csv_from(File::open(path)?, opts)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, opts)?,
        other => {
            return Err(ForecastError::data(format!(
                "unsupported input format '{}' for {}",
                other,
                path.display()
            )))
        }
    };
    series.sort_by_date();

    info!(
        "read {} rows from {:?} ({} missing prices)",
        series.len(),
        path,
        series.missing_count()
    );
    Ok(series)
}

pub fn read_csv_from<R: Read>(reader: R, opts: &ReadOptions) -> ForecastResult<RawSeries> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let (date_idx, value_idx) = resolve_columns(&headers, opts)?;

    let mut points = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let date_text = record.get(date_idx).unwrap_or("");
        let value_text = record.get(value_idx).unwrap_or("");
        if date_text.is_empty() && value_text.is_empty() {
            continue;
        }
        // +2: one for the header, one for 1-based numbering
        let row = line + 2;
        let date = parse_date(date_text).map_err(|e| ForecastError::data(format!("row {}: {}", row, e.msg)))?;
        let value = parse_value(value_text).map_err(|e| ForecastError::data(format!("row {}: {}", row, e.msg)))?;
        points.push(RawPoint::new(date, value));
    }
    Ok(RawSeries::new(points))
}

fn read_workbook(path: &Path, opts: &ReadOptions) -> ForecastResult<RawSeries> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ForecastError::data(format!("workbook {} has no sheets", path.display())))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| ForecastError::data(format!("sheet '{}' is empty", sheet)))?
        .iter()
        .map(|c| c.to_string().trim().to_string())
        .collect();
    let (date_idx, value_idx) = resolve_columns(&headers, opts)?;

    let mut points = Vec::new();
    for (line, cells) in rows.enumerate() {
        let date_cell = cells.get(date_idx).unwrap_or(&Data::Empty);
        let value_cell = cells.get(value_idx).unwrap_or(&Data::Empty);
        if matches!(date_cell, Data::Empty) && matches!(value_cell, Data::Empty) {
            continue;
        }
        let row = line + 2;
        let date = cell_date(date_cell).map_err(|e| ForecastError::data(format!("row {}: {}", row, e.msg)))?;
        let value = cell_value(value_cell).map_err(|e| ForecastError::data(format!("row {}: {}", row, e.msg)))?;
        points.push(RawPoint::new(date, value));
    }
    Ok(RawSeries::new(points))
}

fn resolve_columns(headers: &[String], opts: &ReadOptions) -> ForecastResult<(usize, usize)> {
    let find = |name: &str| headers.iter().position(|h| h.trim() == name.trim());

    let date_idx = find(&opts.date_column).ok_or_else(|| {
        ForecastError::data(format!(
            "date column '{}' not found in [{}]",
            opts.date_column,
            headers.join(", ")
        ))
    })?;
    let value_idx = match &opts.value_column {
        Some(name) => find(name).ok_or_else(|| {
            ForecastError::data(format!("price column '{}' not found in [{}]", name, headers.join(", ")))
        })?,
        None => (0..headers.len())
            .find(|&i| i != date_idx)
            .ok_or_else(|| ForecastError::data("input has no price column"))?,
    };
    Ok((date_idx, value_idx))
}

/// Missing markers become `None`. A comma is read as the decimal separator
/// and spaces as digit grouping; `1,234` could be either and is rejected.
pub fn parse_value(text: &str) -> ForecastResult<Option<f64>> {
    let text = text.trim();
    if MISSING_MARKERS.contains(&text.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }
    if let Ok(v) = text.parse::<f64>() {
        return Ok(Some(v));
    }
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some((_, frac)) = compact.split_once(',') {
        if !compact.contains('.') && frac.len() == 3 && frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ForecastError::data(format!(
                "ambiguous price '{}': comma may be a thousands or a decimal separator",
                text
            )));
        }
    }
    let normalized: String = compact.chars().map(|c| if c == ',' { '.' } else { c }).collect();
    normalized
        .parse::<f64>()
        .map(Some)
        .map_err(|_| ForecastError::data(format!("non-numeric price '{}'", text)))
}

fn cell_date(cell: &Data) -> ForecastResult<NaiveDate> {
    let date = match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) | Data::String(s) => Some(parse_date(s)?),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        _ => None,
    };
    date.ok_or_else(|| ForecastError::data(format!("unparseable date cell '{}'", cell)))
}

fn cell_value(cell: &Data) -> ForecastResult<Option<f64>> {
    match cell {
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) => parse_value(s),
        Data::Empty | Data::Error(_) => Ok(None),
        other => Err(ForecastError::data(format!("non-numeric price cell '{}'", other))),
    }
}
