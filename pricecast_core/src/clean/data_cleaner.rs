use tracing::{debug, info, warn};

use super::clean_config::CleanConfig;
use crate::common::{
    enums::BoundaryFill,
    forecast_error::{ForecastError, ForecastResult},
};
use crate::math::stats::quartiles;
use crate::series::observed_point::{CleanedSeries, ClipBounds, ObservedPoint, RawSeries};

/// Fills gaps by linear interpolation, then winsorizes at the IQR fences.
#[derive(Debug, Clone, Default)]
pub struct DataCleaner {
    conf: CleanConfig,
}

impl DataCleaner {
    pub fn new(conf: CleanConfig) -> Self {
        Self { conf }
    }

    pub fn clean(&self, series: &RawSeries) -> ForecastResult<CleanedSeries> {
        if series.is_empty() {
            return Err(ForecastError::data("series is empty"));
        }
        series.check_order()?;

        let (values, interpolated) = self.interpolate(series)?;
        let bounds = clip_bounds(&values, self.conf.iqr_multiplier)
            .ok_or_else(|| ForecastError::data("cannot compute quartiles"))?;

        let mut clipped = 0;
        let points: Vec<ObservedPoint> = series
            .points()
            .iter()
            .zip(values)
            .map(|(raw, value)| {
                let bounded = bounds.clamp(value);
                if bounded != value {
                    clipped += 1;
                    debug!("clipped {} on {} to {}", value, raw.date, bounded);
                }
                ObservedPoint {
                    date: raw.date,
                    value: bounded,
                }
            })
            .collect();

        info!(
            "cleaned {} points: {} interpolated, {} clipped into [{:.4}, {:.4}]",
            points.len(),
            interpolated,
            clipped,
            bounds.lower,
            bounds.upper
        );
        Ok(CleanedSeries::new(points, bounds, interpolated, clipped))
    }

    /// Returns the gap-free values and how many of them were filled.
    fn interpolate(&self, series: &RawSeries) -> ForecastResult<(Vec<f64>, usize)> {
        let points = series.points();
        let known: Vec<usize> = points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.value.map(|_| i))
            .collect();

        let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
            return Err(ForecastError::data("target column has no values"));
        };

        let mut values: Vec<f64> = points.iter().map(|p| p.value.unwrap_or(f64::NAN)).collect();

        if first > 0 || last < points.len() - 1 {
            if self.conf.boundary_fill == BoundaryFill::Reject {
                return Err(ForecastError::data(format!(
                    "missing values at the series boundary cannot be interpolated ({} leading, {} trailing)",
                    first,
                    points.len() - 1 - last
                )));
            }
            warn!(
                "filling {} leading and {} trailing missing values with the nearest known value",
                first,
                points.len() - 1 - last
            );
            let (head, tail) = (values[first], values[last]);
            values[..first].fill(head);
            values[last + 1..].fill(tail);
        }

        for pair in known.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b - a < 2 {
                continue;
            }
            let (va, vb) = (values[a], values[b]);
            let span = (b - a) as f64;
            for (offset, slot) in values[a + 1..b].iter_mut().enumerate() {
                *slot = va + (vb - va) * (offset + 1) as f64 / span;
            }
        }

        Ok((values, series.missing_count()))
    }
}

/// `[Q1 - k * IQR, Q3 + k * IQR]` over the given values.
pub fn clip_bounds(values: &[f64], iqr_multiplier: f64) -> Option<ClipBounds> {
    let (q1, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    Some(ClipBounds {
        lower: q1 - iqr_multiplier * iqr,
        upper: q3 + iqr_multiplier * iqr,
    })
}
