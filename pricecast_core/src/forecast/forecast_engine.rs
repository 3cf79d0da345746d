use std::collections::BTreeSet;
use tracing::info;

use super::{
    forecast_table::ForecastTable,
    model::{FittedModel, Forecaster, FrameRow, HistoryRow},
    model_config::ModelConfig,
};
use crate::capacity::capacity_estimator::Capacity;
use crate::common::{
    forecast_error::{ForecastError, ForecastResult},
    time::future_dates,
};
use crate::math::{logistic_trend::LogisticTrendForecaster, stats::variance};
use crate::series::observed_point::CleanedSeries;

pub const MAX_FORECAST_HORIZON: usize = 10_000;

/// Fits a capacity-bounded model and turns it into a forecast table.
#[derive(Debug)]
pub struct ForecastEngine {
    conf: ModelConfig,
    forecaster: Box<dyn Forecaster>,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            conf: ModelConfig::default(),
            forecaster: Box::new(LogisticTrendForecaster::new()),
        }
    }
}

impl ForecastEngine {
    pub fn new(conf: ModelConfig) -> ForecastResult<Self> {
        Self::with_forecaster(conf, Box::new(LogisticTrendForecaster::new()))
    }

    pub fn with_forecaster(conf: ModelConfig, forecaster: Box<dyn Forecaster>) -> ForecastResult<Self> {
        conf.validate()?;
        Ok(Self { conf, forecaster })
    }

    pub fn fit(&self, series: &CleanedSeries, capacity: Capacity) -> ForecastResult<Box<dyn FittedModel>> {
        let distinct: BTreeSet<_> = series.dates().collect();
        if distinct.len() < 2 {
            return Err(ForecastError::fit(format!(
                "need at least two distinct dates to fit, got {}",
                distinct.len()
            )));
        }
        let values: Vec<f64> = series.values().collect();
        match variance(&values) {
            Some(v) if v > 0.0 && v.is_finite() => {}
            _ => return Err(ForecastError::fit("series has no variance")),
        }

        let cap = capacity.value();
        let history: Vec<HistoryRow> = series
            .points()
            .iter()
            .map(|p| HistoryRow {
                date: p.date,
                value: p.value,
                cap,
            })
            .collect();

        info!(
            "fitting {} model on {} points, cap {:.4}, seasonality {}, flexibility {}, range {}",
            self.forecaster.name(),
            history.len(),
            cap,
            self.conf.seasonality_strength,
            self.conf.changepoint_flexibility,
            self.conf.changepoint_range
        );
        self.forecaster.fit(&history, &self.conf)
    }

    /// Predict over the fitted dates plus `horizon` future periods.
    pub fn predict(&self, model: &dyn FittedModel, capacity: Capacity, horizon: usize) -> ForecastResult<ForecastTable> {
        if horizon == 0 {
            return Err(ForecastError::predict("horizon must be at least one period"));
        }
        if horizon > MAX_FORECAST_HORIZON {
            return Err(ForecastError::predict(format!(
                "horizon {} exceeds the limit of {} periods",
                horizon, MAX_FORECAST_HORIZON
            )));
        }
        let cap = capacity.value();
        if !(cap.is_finite() && cap > 0.0) {
            return Err(ForecastError::predict(format!("capacity must be positive, got {}", cap)));
        }

        let history = model.history_dates();
        let last = *history
            .last()
            .ok_or_else(|| ForecastError::predict("model has no history"))?;
        let future = future_dates(last, horizon, self.conf.cadence)?;

        let frame: Vec<FrameRow> = history
            .iter()
            .chain(&future)
            .map(|&date| FrameRow { date, cap })
            .collect();

        let rows = model.predict(&frame)?;
        if rows.len() != frame.len() || rows.iter().zip(&frame).any(|(r, f)| r.date != f.date) {
            return Err(ForecastError::predict(format!(
                "model returned {} rows for a frame of {}",
                rows.len(),
                frame.len()
            )));
        }

        let table = ForecastTable::new(rows, history.len())?;
        info!(
            "forecast {} rows ({} future, {} cadence) through {}",
            table.len(),
            horizon,
            self.conf.cadence,
            future.last().map(|d| d.to_string()).unwrap_or_default()
        );
        Ok(table)
    }
}
