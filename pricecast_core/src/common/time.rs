use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime};

use super::enums::Cadence;
use super::forecast_error::{ForecastError, ForecastResult};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a calendar date. Time of day, when present, is dropped.
pub fn parse_date(text: &str) -> ForecastResult<NaiveDate> {
    let text = text.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Ok(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Ok(d);
        }
    }
    Err(ForecastError::data(format!("unparseable date '{}'", text)))
}

/// Convert an Excel serial day number (1900 date system) to a date.
/// Serial 60 is Excel's phantom 1900-02-29 and has no calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let day = serial.trunc() as u64;
    let epoch = match day {
        1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        60 => return None,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(day))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

pub fn is_month_end(date: NaiveDate) -> bool {
    month_end(date.year(), date.month()) == Some(date)
}

/// `horizon` dates of the given cadence, all strictly after `last`.
pub fn future_dates(last: NaiveDate, horizon: usize, cadence: Cadence) -> ForecastResult<Vec<NaiveDate>> {
    let overflow = || ForecastError::predict(format!("forecast horizon overflows the calendar after {}", last));

    let dates: Vec<NaiveDate> = std::iter::successors(first_after(last, cadence), |&d| step(d, cadence))
        .take(horizon)
        .collect();
    if dates.len() < horizon {
        return Err(overflow());
    }
    Ok(dates)
}

fn first_after(last: NaiveDate, cadence: Cadence) -> Option<NaiveDate> {
    match cadence {
        Cadence::Daily | Cadence::Weekly => step(last, cadence),
        Cadence::Monthly => {
            let end = month_end(last.year(), last.month())?;
            if end > last {
                Some(end)
            } else {
                step(end, cadence)
            }
        }
        Cadence::MonthStart => NaiveDate::from_ymd_opt(last.year(), last.month(), 1)?
            .checked_add_months(Months::new(1)),
    }
}

fn step(date: NaiveDate, cadence: Cadence) -> Option<NaiveDate> {
    match cadence {
        Cadence::Daily => date.checked_add_days(Days::new(1)),
        Cadence::Weekly => date.checked_add_days(Days::new(7)),
        Cadence::Monthly => {
            let next = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.checked_add_months(Months::new(1))?;
            month_end(next.year(), next.month())
        }
        Cadence::MonthStart => date.checked_add_months(Months::new(1)),
    }
}
