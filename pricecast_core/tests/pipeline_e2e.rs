use chrono::{Datelike, NaiveDate};
use pricecast_core::common::time::{is_month_end, month_end};
use pricecast_core::{
    estimate_capacity, DataCleaner, ErrCode, Pipeline, PipelineConfig, RawSeries, ReadOptions,
};
use std::io::Write;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three years of month-end rebar prices, one gap and one spike.
fn write_history() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "dt,Rebar price").unwrap();
    for i in 0..36 {
        let date = month_end(2021 + i / 12, (i % 12) as u32 + 1).unwrap();
        let price = match i {
            10 => String::new(),
            20 => "250000".to_string(),
            _ => format!("{:.1}", 52_000.0 + 180.0 * i as f64 + 2_400.0 * ((i % 12) as f64 - 6.0).abs()),
        };
        writeln!(file, "{},{}", date, price).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_file_to_forecast() {
    let file = write_history();
    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let result = pipeline.run_file(file.path(), &ReadOptions::default()).unwrap();

    // cleaning keeps every row, fills the gap and clamps the spike
    assert_eq!(result.cleaned.len(), 36);
    assert_eq!(result.cleaned.interpolated_count(), 1);
    assert!(result.cleaned.clipped_count() >= 1);
    let bounds = result.cleaned.bounds();
    assert!(result.cleaned.values().all(|v| bounds.contains(v)));
    assert!(result.cleaned.points()[20].value < 250_000.0);

    // capacity is the single ceiling on every row
    let max = result.cleaned.max_value().unwrap();
    assert!((result.capacity.value() - max * 1.1).abs() < 1e-6);
    assert!(result.table.rows().iter().all(|r| r.cap == result.capacity.value()));

    // twelve month ends after 2023-12-31
    let future = result.table.future();
    assert_eq!(future.len(), 12);
    assert_eq!(future[0].date, ymd(2024, 1, 31));
    assert_eq!(future[11].date, ymd(2024, 12, 31));
    for pair in future.windows(2) {
        assert!(is_month_end(pair[1].date));
        assert_eq!(pair[1].date.month0(), (pair[0].date.month0() + 1) % 12);
    }

    for row in result.table.rows() {
        assert!(row.lower_bound <= row.predicted && row.predicted <= row.upper_bound);
    }

    let query = result.query();
    let hit = query.lookup(ymd(2024, 1, 31)).unwrap();
    assert_eq!(hit.date, ymd(2024, 1, 31));
    assert_eq!(query.lookup(ymd(2024, 2, 15)).unwrap_err().errcode, ErrCode::NotFound);

    let chart = result.chart_data();
    assert_eq!(chart.historical.len(), 36);
    assert_eq!(chart.forecast.len(), 48);
}

#[test]
fn test_interpolation_and_capacity_scenarios() {
    let raw = RawSeries::from_pairs(vec![
        (ymd(2023, 1, 1), Some(100.0)),
        (ymd(2023, 2, 1), None),
        (ymd(2023, 3, 1), Some(120.0)),
    ]);
    let cleaned = DataCleaner::default().clean(&raw).unwrap();
    assert_eq!(cleaned.points()[1].value, 110.0);

    let cap = estimate_capacity(&cleaned, 1.1).unwrap();
    assert!((cap.value() - 132.0).abs() < 1e-9);
}

#[test]
fn test_missing_column_stops_the_run() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "date,price\n2023-01-31,1").unwrap();
    file.flush().unwrap();

    let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
    let err = pipeline.run_file(file.path(), &ReadOptions::default()).unwrap_err();
    assert_eq!(err.errcode, ErrCode::DataError);
}
