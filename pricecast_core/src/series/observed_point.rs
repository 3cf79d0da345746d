use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::common::forecast_error::{ForecastError, ForecastResult};

/// A row as read from the input, before repair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl RawPoint {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        // NaN and infinities count as missing.
        Self {
            date,
            value: value.filter(|v| v.is_finite()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeries {
    points: Vec<RawPoint>,
}

impl RawSeries {
    pub fn new(points: Vec<RawPoint>) -> Self {
        Self { points }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        Self::new(pairs.into_iter().map(|(d, v)| RawPoint::new(d, v)).collect())
    }

    pub fn points(&self) -> &[RawPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_none()).count()
    }

    /// Sort rows by date; the sort is stable so duplicates keep file order.
    pub fn sort_by_date(&mut self) {
        self.points.sort_by_key(|p| p.date);
    }

    /// Timestamps must be strictly increasing.
    pub fn check_order(&self) -> ForecastResult<()> {
        for pair in self.points.windows(2) {
            if pair[1].date <= pair[0].date {
                let reason = if pair[1].date == pair[0].date {
                    "duplicate date"
                } else {
                    "dates out of order at"
                };
                return Err(ForecastError::data(format!("{} {}", reason, pair[1].date)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Inclusive winsorization range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ClipBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Gap-free, winsorized series. Same length and dates as its source.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSeries {
    points: Vec<ObservedPoint>,
    bounds: ClipBounds,
    interpolated: usize,
    clipped: usize,
}

impl CleanedSeries {
    pub(crate) fn new(points: Vec<ObservedPoint>, bounds: ClipBounds, interpolated: usize, clipped: usize) -> Self {
        Self {
            points,
            bounds,
            interpolated,
            clipped,
        }
    }

    pub fn points(&self) -> &[ObservedPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bounds(&self) -> ClipBounds {
        self.bounds
    }

    /// Number of missing values that were filled
    pub fn interpolated_count(&self) -> usize {
        self.interpolated
    }

    /// Number of values moved onto a clip bound
    pub fn clipped_count(&self) -> usize {
        self.clipped
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn max_value(&self) -> Option<f64> {
        self.values().fold(None, |acc, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v),
        })
    }
}
