//! Contract between the engine and the statistical model that does the fitting.

use chrono::NaiveDate;
use std::fmt;

use super::forecast_table::ForecastPoint;
use super::model_config::ModelConfig;
use crate::common::forecast_error::ForecastResult;

/// One training row: observation plus the capacity in force on that date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub value: f64,
    pub cap: f64,
}

/// One row to predict
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow {
    pub date: NaiveDate,
    pub cap: f64,
}

/// A growth/seasonality model that can be fitted to a history.
pub trait Forecaster: fmt::Debug {
    fn name(&self) -> &str;

    fn fit(&self, history: &[HistoryRow], conf: &ModelConfig) -> ForecastResult<Box<dyn FittedModel>>;
}

/// Result of a fit: produces point forecasts with uncertainty bounds.
pub trait FittedModel: fmt::Debug {
    /// Dates the model was fitted on, ascending
    fn history_dates(&self) -> &[NaiveDate];

    /// One output row per frame row, same order
    fn predict(&self, frame: &[FrameRow]) -> ForecastResult<Vec<ForecastPoint>>;
}
