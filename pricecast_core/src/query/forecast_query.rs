use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::common::{
    forecast_error::{ForecastError, ForecastResult},
    time::{format_date, parse_date},
};
use crate::forecast::forecast_table::{ForecastPoint, ForecastTable};

/// Read-only, exact-date access to a forecast table
#[derive(Debug, Clone, Copy)]
pub struct ForecastQuery<'a> {
    table: &'a ForecastTable,
}

impl<'a> ForecastQuery<'a> {
    pub fn new(table: &'a ForecastTable) -> Self {
        Self { table }
    }

    /// The row whose date equals `date`; no nearest-date fallback.
    pub fn lookup(&self, date: NaiveDate) -> ForecastResult<&'a ForecastPoint> {
        self.table
            .get(date)
            .ok_or_else(|| ForecastError::not_found(format!("no forecast for {}", format_date(date))))
    }

    pub fn lookup_str(&self, date: &str) -> ForecastResult<&'a ForecastPoint> {
        self.lookup(parse_date(date)?)
    }

    /// Rows in the inclusive window `[from, to]`
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> &'a [ForecastPoint] {
        self.table.between(from, to)
    }

    /// Dates a caller may query, ascending
    pub fn available_dates(&self) -> Vec<String> {
        self.table.dates().map(format_date).collect()
    }

    pub fn result(&self, date: NaiveDate) -> ForecastResult<QueryResult> {
        self.lookup(date).map(QueryResult::from)
    }
}

/// Lookup answer ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl QueryResult {
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl From<&ForecastPoint> for QueryResult {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            date: p.date,
            predicted: p.predicted,
            lower_bound: p.lower_bound,
            upper_bound: p.upper_bound,
            unit: None,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.unit.as_deref().map(|u| format!(" {}", u)).unwrap_or_default();
        writeln!(f, "Date: {}", format_date(self.date))?;
        writeln!(f, "Predicted price: {:.2}{}", self.predicted, unit)?;
        write!(f, "Interval: [{:.2}, {:.2}]", self.lower_bound, self.upper_bound)
    }
}
