use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

use crate::common::forecast_error::{ForecastError, ForecastResult};

/// Key/value settings where every key must be consumed exactly once.
#[derive(Debug, Default)]
pub struct ConfigWithCheck {
    conf: HashMap<String, serde_json::Value>,
}

impl ConfigWithCheck {
    pub fn new(conf: HashMap<String, serde_json::Value>) -> Self {
        Self { conf }
    }

    /// Take `key` out of the map, decoding it as `T`.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> ForecastResult<Option<T>> {
        match self.conf.remove(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => serde_json::from_value(v)
                .map(Some)
                .map_err(|e| ForecastError::config(format!("bad value for {}: {}", key, e))),
        }
    }

    /// Take `key` out of the map as a string and parse it with `FromStr`.
    pub fn get_parsed<T: FromStr>(&mut self, key: &str) -> ForecastResult<Option<T>> {
        let Some(text) = self.get::<String>(key)? else {
            return Ok(None);
        };
        text.parse()
            .map(Some)
            .map_err(|_| ForecastError::config(format!("unknown {} = {}", key, text)))
    }

    /// Fails on any key nobody asked for.
    pub fn check(&self) -> ForecastResult<()> {
        let mut left: Vec<&String> = self.conf.keys().collect();
        left.sort();
        match left.first() {
            Some(k) => Err(ForecastError::config(format!("unknown para = {}", k))),
            None => Ok(()),
        }
    }
}
