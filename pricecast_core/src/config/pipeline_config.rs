use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::config_with_check::ConfigWithCheck;
use crate::capacity::capacity_estimator::DEFAULT_GROWTH_MARGIN;
use crate::clean::clean_config::CleanConfig;
use crate::common::forecast_error::{ForecastError, ForecastResult};
use crate::forecast::{forecast_engine::MAX_FORECAST_HORIZON, model_config::ModelConfig};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub clean_conf: CleanConfig,
    pub model_conf: ModelConfig,
    pub growth_margin: f64,
    pub forecast_horizon: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clean_conf: CleanConfig::default(),
            model_conf: ModelConfig::default(),
            growth_margin: DEFAULT_GROWTH_MARGIN,
            forecast_horizon: 12,
        }
    }
}

impl PipelineConfig {
    pub fn new(conf: Option<HashMap<String, serde_json::Value>>) -> ForecastResult<Self> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());
        let model_default = ModelConfig::default();

        let clean_conf = CleanConfig::new(conf.get("iqr_multiplier")?, conf.get_parsed("boundary_fill")?);

        let model_conf = ModelConfig {
            seasonality_strength: conf
                .get("seasonality_strength")?
                .unwrap_or(model_default.seasonality_strength),
            changepoint_flexibility: conf
                .get("changepoint_flexibility")?
                .unwrap_or(model_default.changepoint_flexibility),
            changepoint_range: conf.get("changepoint_range")?.unwrap_or(model_default.changepoint_range),
            n_changepoints: conf.get("n_changepoints")?.unwrap_or(model_default.n_changepoints),
            yearly_fourier_order: conf
                .get("yearly_fourier_order")?
                .unwrap_or(model_default.yearly_fourier_order),
            interval_width: conf.get("interval_width")?.unwrap_or(model_default.interval_width),
            cadence: conf.get_parsed("period_cadence")?.unwrap_or(model_default.cadence),
        };

        let config = Self {
            clean_conf,
            model_conf,
            growth_margin: conf.get("growth_margin")?.unwrap_or(DEFAULT_GROWTH_MARGIN),
            forecast_horizon: conf.get("forecast_horizon")?.unwrap_or(12),
        };

        conf.check()?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON object of settings from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> ForecastResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let map: HashMap<String, serde_json::Value> = serde_json::from_reader(reader)?;
        Self::new(Some(map))
    }

    pub fn validate(&self) -> ForecastResult<()> {
        if !(self.growth_margin.is_finite() && self.growth_margin > 0.0) {
            return Err(ForecastError::config(format!(
                "growth_margin must be positive, got {}",
                self.growth_margin
            )));
        }
        if !(self.clean_conf.iqr_multiplier.is_finite() && self.clean_conf.iqr_multiplier >= 0.0) {
            return Err(ForecastError::config(format!(
                "iqr_multiplier must be non-negative, got {}",
                self.clean_conf.iqr_multiplier
            )));
        }
        if self.forecast_horizon == 0 || self.forecast_horizon > MAX_FORECAST_HORIZON {
            return Err(ForecastError::config(format!(
                "forecast_horizon must be in 1..={}, got {}",
                MAX_FORECAST_HORIZON, self.forecast_horizon
            )));
        }
        self.model_conf.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{
        enums::{BoundaryFill, Cadence},
        forecast_error::ErrCode,
    };
    use serde_json::json;
    use std::io::Write;

    fn from_json(value: serde_json::Value) -> ForecastResult<PipelineConfig> {
        PipelineConfig::new(Some(serde_json::from_value(value).unwrap()))
    }

    #[test]
    fn test_defaults() {
        let conf = PipelineConfig::new(None).unwrap();
        assert_eq!(conf, PipelineConfig::default());
        assert_eq!(conf.growth_margin, 1.1);
        assert_eq!(conf.forecast_horizon, 12);
        assert_eq!(conf.model_conf.cadence, Cadence::Monthly);
        assert_eq!(conf.clean_conf.iqr_multiplier, 1.5);
    }

    #[test]
    fn test_overrides() {
        let conf = from_json(json!({
            "growth_margin": 1.25,
            "seasonality_strength": 5,
            "changepoint_flexibility": 0.05,
            "changepoint_range": 0.8,
            "forecast_horizon": 24,
            "period_cadence": "month_start",
            "boundary_fill": "reject",
            "iqr_multiplier": 3.0
        }))
        .unwrap();
        assert_eq!(conf.growth_margin, 1.25);
        assert_eq!(conf.model_conf.seasonality_strength, 5.0);
        assert_eq!(conf.model_conf.changepoint_flexibility, 0.05);
        assert_eq!(conf.model_conf.changepoint_range, 0.8);
        assert_eq!(conf.forecast_horizon, 24);
        assert_eq!(conf.model_conf.cadence, Cadence::MonthStart);
        assert_eq!(conf.clean_conf.boundary_fill, BoundaryFill::Reject);
        assert_eq!(conf.clean_conf.iqr_multiplier, 3.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = from_json(json!({"growth": 1.2})).unwrap_err();
        assert_eq!(err.errcode, ErrCode::ConfigError);
        assert!(err.msg.contains("growth"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(from_json(json!({"forecast_horizon": 0})).is_err());
        assert!(from_json(json!({"growth_margin": -1.0})).is_err());
        assert!(from_json(json!({"forecast_horizon": -3})).is_err());
        assert!(from_json(json!({"period_cadence": "hourly"})).is_err());
        assert!(from_json(json!({"interval_width": 1.2})).is_err());
    }

    #[test]
    fn test_oversized_settings_rejected() {
        let err = from_json(json!({"forecast_horizon": u64::MAX})).unwrap_err();
        assert_eq!(err.errcode, ErrCode::ConfigError);
        assert!(err.msg.contains("forecast_horizon"));

        let err = from_json(json!({"yearly_fourier_order": 4_000_000_000u64})).unwrap_err();
        assert_eq!(err.errcode, ErrCode::ConfigError);

        let err = from_json(json!({"n_changepoints": 1_000_000})).unwrap_err();
        assert_eq!(err.errcode, ErrCode::ConfigError);

        assert!(from_json(json!({"forecast_horizon": MAX_FORECAST_HORIZON})).is_ok());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"forecast_horizon": 6, "growth_margin": null}}"#).unwrap();
        let conf = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(conf.forecast_horizon, 6);
        assert_eq!(conf.growth_margin, 1.1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PipelineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.errcode, ErrCode::IoError);
    }
}
