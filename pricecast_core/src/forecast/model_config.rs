use crate::common::{
    enums::Cadence,
    forecast_error::{ForecastError, ForecastResult},
};

pub const MAX_CHANGEPOINTS: usize = 1_000;
pub const MAX_FOURIER_ORDER: usize = 100;

/// Tunables handed to the forecasting model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Prior scale of the yearly seasonality; larger lets it fit stronger swings
    pub seasonality_strength: f64,

    /// Prior scale of trend changes at changepoints
    pub changepoint_flexibility: f64,

    /// Share of the history in which changepoints may be placed
    pub changepoint_range: f64,

    /// Number of potential changepoints
    pub n_changepoints: usize,

    /// Fourier order of the yearly seasonality
    pub yearly_fourier_order: usize,

    /// Coverage of the uncertainty interval
    pub interval_width: f64,

    /// Spacing of the extrapolated dates
    pub cadence: Cadence,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seasonality_strength: 20.0,
            changepoint_flexibility: 0.5,
            changepoint_range: 0.9,
            n_changepoints: 25,
            yearly_fourier_order: 10,
            interval_width: 0.8,
            cadence: Cadence::Monthly,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> ForecastResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ForecastError::config(format!("{} must be positive, got {}", name, v)))
            }
        };
        positive("seasonality_strength", self.seasonality_strength)?;
        positive("changepoint_flexibility", self.changepoint_flexibility)?;

        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::config(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if self.n_changepoints > MAX_CHANGEPOINTS {
            return Err(ForecastError::config(format!(
                "n_changepoints must be at most {}, got {}",
                MAX_CHANGEPOINTS, self.n_changepoints
            )));
        }
        if self.yearly_fourier_order > MAX_FOURIER_ORDER {
            return Err(ForecastError::config(format!(
                "yearly_fourier_order must be at most {}, got {}",
                MAX_FOURIER_ORDER, self.yearly_fourier_order
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::config(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        Ok(())
    }
}
