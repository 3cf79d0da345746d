use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error codes for the forecasting pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // Input errors (0-99)
    #[strum(serialize = "DATA_ERROR")]
    DataError = 1,
    #[strum(serialize = "IO_ERROR")]
    IoError = 2,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 3,

    // Model errors (100-199)
    #[strum(serialize = "FIT_ERROR")]
    FitError = 101,
    #[strum(serialize = "PREDICT_ERROR")]
    PredictError = 102,

    // Query errors (200-299)
    #[strum(serialize = "NOT_FOUND")]
    NotFound = 201,
}

impl ErrCode {
    pub fn is_input_err(&self) -> bool {
        (*self as i32) < 100
    }

    pub fn is_model_err(&self) -> bool {
        let code = *self as i32;
        (100..200).contains(&code)
    }
}

#[derive(Debug, Error)]
#[error("{errcode}: {msg}")]
pub struct ForecastError {
    pub errcode: ErrCode,
    pub msg: String,
}

impl ForecastError {
    pub fn new(message: impl Into<String>, code: ErrCode) -> Self {
        Self {
            errcode: code,
            msg: message.into(),
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::DataError)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::ConfigError)
    }

    pub fn fit(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::FitError)
    }

    pub fn predict(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::PredictError)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, ErrCode::NotFound)
    }

    pub fn is_input_err(&self) -> bool {
        self.errcode.is_input_err()
    }

    pub fn is_model_err(&self) -> bool {
        self.errcode.is_model_err()
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string(), ErrCode::IoError)
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            Self::new(err.to_string(), ErrCode::IoError)
        } else {
            Self::data(format!("malformed csv: {}", err))
        }
    }
}

impl From<calamine::Error> for ForecastError {
    fn from(err: calamine::Error) -> Self {
        match err {
            calamine::Error::Io(e) => Self::from(e),
            other => Self::data(format!("unreadable workbook: {}", other)),
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::new(err.to_string(), ErrCode::IoError)
        } else {
            Self::config(format!("invalid json: {}", err))
        }
    }
}

pub type ForecastResult<T> = Result<T, ForecastError>;
