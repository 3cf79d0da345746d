use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::common::forecast_error::{ForecastError, ForecastResult};
use crate::series::observed_point::CleanedSeries;

pub const DEFAULT_GROWTH_MARGIN: f64 = 1.1;

/// Saturation ceiling of the logistic trend, constant over the horizon
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Capacity(f64);

impl Capacity {
    pub fn new(value: f64) -> ForecastResult<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ForecastError::predict(format!("capacity must be positive and finite, got {}", value)));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CapacityEstimator {
    margin: f64,
}

impl Default for CapacityEstimator {
    fn default() -> Self {
        Self {
            margin: DEFAULT_GROWTH_MARGIN,
        }
    }
}

impl CapacityEstimator {
    pub fn new(margin: f64) -> ForecastResult<Self> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(ForecastError::config(format!("growth_margin must be positive, got {}", margin)));
        }
        if margin <= 1.0 {
            warn!("growth_margin {} does not lift the capacity above the historical maximum", margin);
        }
        Ok(Self { margin })
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// `max(value) * margin` over the cleaned series
    pub fn estimate(&self, series: &CleanedSeries) -> ForecastResult<Capacity> {
        if series.is_empty() {
            return Err(ForecastError::data("cannot estimate capacity of an empty series"));
        }
        if let Some(bad) = series.points().iter().find(|p| !p.value.is_finite()) {
            return Err(ForecastError::data(format!("non-finite value on {}", bad.date)));
        }
        let max = series
            .max_value()
            .ok_or_else(|| ForecastError::data("cannot estimate capacity of an empty series"))?;

        let cap = max * self.margin;
        info!("capacity {:.4} = max {:.4} x margin {}", cap, max, self.margin);
        Capacity::new(cap).map_err(|_| {
            ForecastError::data(format!(
                "capacity {} derived from max {} is not positive; prices must be positive",
                cap, max
            ))
        })
    }
}

pub fn estimate_capacity(series: &CleanedSeries, margin: f64) -> ForecastResult<Capacity> {
    CapacityEstimator::new(margin)?.estimate(series)
}
