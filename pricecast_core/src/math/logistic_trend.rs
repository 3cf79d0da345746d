use chrono::{Datelike, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;
use tracing::debug;

use super::linalg::Matrix;
use crate::common::forecast_error::{ForecastError, ForecastResult};
use crate::forecast::{
    forecast_table::ForecastPoint,
    model::{FittedModel, Forecaster, FrameRow, HistoryRow},
    model_config::ModelConfig,
};

const YEAR_DAYS: f64 = 365.25;
const RATIO_EPS: f64 = 1e-6;
const TREND_RIDGE: f64 = 1e-9;
const MIN_PILOT_VARIANCE: f64 = 1e-4;

/// Logistic growth with piecewise-linear rate changes and yearly Fourier
/// seasonality, fitted as a ridge regression on the logit of `y / cap`.
///
/// The trend `logit(g / cap)` is continuous and piecewise linear in time, with
/// kinks at changepoints spread over the first `changepoint_range` of the
/// history. Changepoint and seasonal coefficients are shrunk towards zero with
/// strengths `1 / flexibility²` and `1 / strength²` relative to the residual
/// variance of a pilot straight-line fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticTrendForecaster;

impl LogisticTrendForecaster {
    pub fn new() -> Self {
        Self
    }
}

impl Forecaster for LogisticTrendForecaster {
    fn name(&self) -> &str {
        "logistic-trend"
    }

    fn fit(&self, history: &[HistoryRow], conf: &ModelConfig) -> ForecastResult<Box<dyn FittedModel>> {
        let (first, last) = match (history.first(), history.last()) {
            (Some(f), Some(l)) => (f.date, l.date),
            _ => return Err(ForecastError::fit("no history to fit")),
        };
        let span_days = (last - first).num_days() as f64;
        if span_days <= 0.0 {
            return Err(ForecastError::fit("history spans a single date"));
        }
        if let Some(bad) = history.iter().find(|r| !(r.cap.is_finite() && r.cap > 0.0)) {
            return Err(ForecastError::fit(format!("invalid capacity {} on {}", bad.cap, bad.date)));
        }

        let t: Vec<f64> = history
            .iter()
            .map(|r| (r.date - first).num_days() as f64 / span_days)
            .collect();
        let z: Vec<f64> = history.iter().map(|r| logit(r.value / r.cap)).collect();

        let changepoints = place_changepoints(&t, conf.changepoint_range, conf.n_changepoints);
        let layout = Layout {
            changepoints,
            fourier_order: conf.yearly_fourier_order,
        };
        let p = layout.width();

        let rows: Vec<Vec<f64>> = history.iter().zip(&t).map(|(r, &ti)| layout.features(ti, r.date)).collect();

        let pilot = pilot_variance(&t, &z).max(MIN_PILOT_VARIANCE);
        let (mut xtx, xty) = Matrix::normal_equations(p, rows.iter().map(|r| r.as_slice()), &z);
        for i in 0..p {
            let penalty = match layout.kind(i) {
                Term::Trend => TREND_RIDGE,
                Term::Changepoint => pilot / conf.changepoint_flexibility.powi(2),
                Term::Seasonal => pilot / conf.seasonality_strength.powi(2),
            };
            xtx.add(i, i, penalty);
        }
        let beta = xtx
            .solve(&xty)
            .ok_or_else(|| ForecastError::fit("regression system is singular"))?;

        let residual_sq: f64 = rows
            .iter()
            .zip(&z)
            .map(|(row, &zi)| (zi - dot(row, &beta)).powi(2))
            .sum();
        let sigma = (residual_sq / history.len() as f64).sqrt();

        let z_score = interval_z_score(conf.interval_width)?;

        debug!(
            "fitted {} params ({} changepoints) on {} rows; pilot var {:.3e}, residual sd {:.4}",
            p,
            layout.changepoints.len(),
            history.len(),
            pilot,
            sigma
        );

        Ok(Box::new(LogisticTrendModel {
            start: first,
            span_days,
            step: 1.0 / (history.len() - 1) as f64,
            layout,
            beta,
            sigma,
            z_score,
            dates: history.iter().map(|r| r.date).collect(),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct LogisticTrendModel {
    start: NaiveDate,
    span_days: f64,
    /// Mean spacing of history rows in scaled time
    step: f64,
    layout: Layout,
    beta: Vec<f64>,
    sigma: f64,
    z_score: f64,
    dates: Vec<NaiveDate>,
}

impl FittedModel for LogisticTrendModel {
    fn history_dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    fn predict(&self, frame: &[FrameRow]) -> ForecastResult<Vec<ForecastPoint>> {
        frame
            .iter()
            .map(|row| {
                if !(row.cap.is_finite() && row.cap > 0.0) {
                    return Err(ForecastError::predict(format!("invalid capacity {} on {}", row.cap, row.date)));
                }
                let t = (row.date - self.start).num_days() as f64 / self.span_days;
                let z = dot(&self.layout.features(t, row.date), &self.beta);

                // Periods beyond the end of history widen the interval.
                let ahead = ((t - 1.0) / self.step).max(0.0);
                let half_width = self.z_score * self.sigma * (1.0 + ahead).sqrt();

                Ok(ForecastPoint {
                    date: row.date,
                    predicted: row.cap * sigmoid(z),
                    lower_bound: row.cap * sigmoid(z - half_width),
                    upper_bound: row.cap * sigmoid(z + half_width),
                    cap: row.cap,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Trend,
    Changepoint,
    Seasonal,
}

/// Column layout: `[1, t, (t - s_1)+ .. (t - s_m)+, sin_1, cos_1 .. sin_K, cos_K]`
#[derive(Debug, Clone)]
struct Layout {
    changepoints: Vec<f64>,
    fourier_order: usize,
}

impl Layout {
    fn width(&self) -> usize {
        2 + self.changepoints.len() + 2 * self.fourier_order
    }

    fn kind(&self, col: usize) -> Term {
        if col < 2 {
            Term::Trend
        } else if col < 2 + self.changepoints.len() {
            Term::Changepoint
        } else {
            Term::Seasonal
        }
    }

    fn features(&self, t: f64, date: NaiveDate) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|&s| (t - s).max(0.0)));

        let days = date.num_days_from_ce() as f64;
        for k in 1..=self.fourier_order {
            let angle = 2.0 * PI * k as f64 * days / YEAR_DAYS;
            row.push(angle.sin());
            row.push(angle.cos());
        }
        row
    }
}

/// Two-sided standard normal quantile for a central interval of `width`.
fn interval_z_score(width: f64) -> ForecastResult<f64> {
    if !(width > 0.0 && width < 1.0) {
        return Err(ForecastError::fit(format!("invalid interval width {}", width)));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::fit(format!("standard normal: {}", e)))?;
    let z = normal.inverse_cdf(0.5 + width / 2.0);
    if z.is_finite() {
        Ok(z)
    } else {
        Err(ForecastError::fit(format!("invalid interval width {}", width)))
    }
}

/// Changepoints at evenly spaced rows of the first `range` share of history.
fn place_changepoints(t: &[f64], range: f64, requested: usize) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let count = requested.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }
    let last = (hist_size - 1) as f64;
    let mut points: Vec<f64> = (1..=count)
        .map(|i| {
            let idx = (last * i as f64 / count as f64).round() as usize;
            t[idx]
        })
        .collect();
    points.dedup();
    points
}

/// Residual variance of a straight line through `(t, z)`.
fn pilot_variance(t: &[f64], z: &[f64]) -> f64 {
    let rows: Vec<[f64; 2]> = t.iter().map(|&ti| [1.0, ti]).collect();
    let (xtx, xty) = Matrix::normal_equations(2, rows.iter().map(|r| r.as_slice()), z);
    let Some(beta) = xtx.solve(&xty) else {
        return 0.0;
    };
    let ss: f64 = rows.iter().zip(z).map(|(r, &zi)| (zi - dot(r, &beta)).powi(2)).sum();
    ss / z.len() as f64
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn logit(ratio: f64) -> f64 {
    let r = ratio.clamp(RATIO_EPS, 1.0 - RATIO_EPS);
    (r / (1.0 - r)).ln()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::time::month_end;

    #[test]
    fn test_interval_z_score() {
        assert!((interval_z_score(0.8).unwrap() - 1.281_551_565_5).abs() < 1e-6);
        assert!((interval_z_score(0.95).unwrap() - 1.959_963_985).abs() < 1e-6);
        assert_eq!(interval_z_score(1.0).unwrap_err().errcode, crate::common::forecast_error::ErrCode::FitError);
        assert!(interval_z_score(0.0).is_err());
    }

    fn month_ends(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| month_end(2018 + (i / 12) as i32, (i % 12) as u32 + 1).unwrap())
            .collect()
    }

    fn history(values: &[f64], cap: f64) -> Vec<HistoryRow> {
        month_ends(values.len())
            .into_iter()
            .zip(values)
            .map(|(date, &value)| HistoryRow { date, value, cap })
            .collect()
    }

    fn seasonal_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 50_000.0 + 300.0 * i as f64 + 2_000.0 * (2.0 * PI * i as f64 / 12.0).sin())
            .collect()
    }

    #[test]
    fn test_logit_sigmoid_inverse() {
        for r in [0.1, 0.5, 0.9] {
            assert!((sigmoid(logit(r)) - r).abs() < 1e-12);
        }
        assert!(logit(0.0).is_finite());
        assert!(logit(1.5).is_finite());
    }

    #[test]
    fn test_changepoint_placement() {
        let t: Vec<f64> = (0..11).map(|i| i as f64 / 10.0).collect();
        // floor(11 * 0.9) = 9 rows eligible -> at most 8 changepoints
        let cps = place_changepoints(&t, 0.9, 25);
        assert_eq!(cps.len(), 8);
        assert!(cps.iter().all(|&c| c > 0.0 && c <= 0.8 + 1e-12));
        assert!(place_changepoints(&t[..2], 0.9, 25).is_empty());
    }

    #[test]
    fn test_fit_tracks_history() {
        let values = seasonal_series(48);
        let cap = 80_000.0;
        let model = LogisticTrendForecaster::new()
            .fit(&history(&values, cap), &ModelConfig::default())
            .unwrap();
        let frame: Vec<FrameRow> = month_ends(48).into_iter().map(|date| FrameRow { date, cap }).collect();
        let out = model.predict(&frame).unwrap();

        assert_eq!(out.len(), 48);
        let mean_abs_err: f64 = out.iter().zip(&values).map(|(p, v)| (p.predicted - v).abs()).sum::<f64>() / 48.0;
        assert!(mean_abs_err < 1_500.0, "mean abs error {}", mean_abs_err);
    }

    #[test]
    fn test_predictions_bounded_and_ordered() {
        let values = seasonal_series(36);
        let cap = 70_000.0;
        let model = LogisticTrendForecaster::new()
            .fit(&history(&values, cap), &ModelConfig::default())
            .unwrap();
        let frame: Vec<FrameRow> = month_ends(60).into_iter().map(|date| FrameRow { date, cap }).collect();
        for p in model.predict(&frame).unwrap() {
            assert!(p.lower_bound <= p.predicted && p.predicted <= p.upper_bound);
            assert!(p.upper_bound <= cap);
            assert!(p.lower_bound >= 0.0);
        }
    }

    #[test]
    fn test_interval_widens_past_history() {
        let values = seasonal_series(36);
        let cap = 70_000.0;
        let model = LogisticTrendForecaster::new()
            .fit(&history(&values, cap), &ModelConfig::default())
            .unwrap();
        let dates = month_ends(60);
        let frame = [FrameRow { date: dates[35], cap }, FrameRow { date: dates[59], cap }];
        let out = model.predict(&frame).unwrap();
        let width = |p: &ForecastPoint| p.upper_bound - p.lower_bound;
        assert!(width(&out[1]) > width(&out[0]));
    }

    #[test]
    fn test_single_date_is_fit_error() {
        let rows = history(&[10.0], 20.0);
        let err = LogisticTrendForecaster::new()
            .fit(&rows, &ModelConfig::default())
            .unwrap_err();
        assert!(err.is_model_err());
    }

    #[test]
    fn test_two_points_fit() {
        let rows = history(&[10.0, 12.0], 13.2);
        let model = LogisticTrendForecaster::new().fit(&rows, &ModelConfig::default()).unwrap();
        assert_eq!(model.history_dates().len(), 2);
    }
}
