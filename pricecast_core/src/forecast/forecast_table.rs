use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;

use crate::common::forecast_error::{ForecastError, ForecastResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub cap: f64,
}

impl ForecastPoint {
    /// Finite values with `lower_bound <= predicted <= upper_bound`
    pub fn is_consistent(&self) -> bool {
        [self.predicted, self.lower_bound, self.upper_bound, self.cap]
            .iter()
            .all(|v| v.is_finite())
            && self.lower_bound <= self.predicted
            && self.predicted <= self.upper_bound
    }
}

/// Back-fitted history followed by the extrapolated horizon.
/// Built once per run, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ForecastTable {
    rows: Vec<ForecastPoint>,
    index: HashMap<NaiveDate, usize>,
    history_len: usize,
}

impl ForecastTable {
    pub(crate) fn new(rows: Vec<ForecastPoint>, history_len: usize) -> ForecastResult<Self> {
        if history_len > rows.len() {
            return Err(ForecastError::predict("history longer than forecast table"));
        }
        for pair in rows.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ForecastError::predict(format!("forecast dates not increasing at {}", pair[1].date)));
            }
        }
        if let Some(bad) = rows.iter().find(|r| !r.is_consistent()) {
            return Err(ForecastError::predict(format!(
                "inconsistent forecast on {}: {} not within [{}, {}]",
                bad.date, bad.predicted, bad.lower_bound, bad.upper_bound
            )));
        }

        let index = rows.iter().enumerate().map(|(i, r)| (r.date, i)).collect();
        Ok(Self {
            rows,
            index,
            history_len,
        })
    }

    pub fn rows(&self) -> &[ForecastPoint] {
        &self.rows
    }

    /// Rows at historical dates
    pub fn history(&self) -> &[ForecastPoint] {
        &self.rows[..self.history_len]
    }

    /// Rows past the last historical date
    pub fn future(&self) -> &[ForecastPoint] {
        &self.rows[self.history_len..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.iter().map(|r| r.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ForecastPoint> {
        self.index.get(&date).map(|&i| &self.rows[i])
    }

    /// Rows with `from <= date <= to`
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> &[ForecastPoint] {
        let start = self.rows.partition_point(|r| r.date < from);
        let end = self.rows.partition_point(|r| r.date <= to);
        if start >= end {
            &[]
        } else {
            &self.rows[start..end]
        }
    }
}

impl Index<usize> for ForecastTable {
    type Output = ForecastPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.rows[index]
    }
}
