use chrono::NaiveDate;
use serde::Serialize;

use crate::forecast::forecast_table::ForecastTable;
use crate::series::observed_point::CleanedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastBand {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Plot-ready series; rendering is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub historical: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastBand>,
}

pub struct ChartDataAssembler;

impl ChartDataAssembler {
    pub fn assemble(series: &CleanedSeries, table: &ForecastTable) -> ChartData {
        ChartData {
            historical: series
                .points()
                .iter()
                .map(|p| HistoricalPoint {
                    date: p.date,
                    value: p.value,
                })
                .collect(),
            forecast: table
                .rows()
                .iter()
                .map(|r| ForecastBand {
                    date: r.date,
                    predicted: r.predicted,
                    lower: r.lower_bound,
                    upper: r.upper_bound,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::data_cleaner::DataCleaner;
    use crate::forecast::forecast_table::tests::month_end_table;
    use crate::series::observed_point::RawSeries;

    #[test]
    fn test_assemble_projects_fields() {
        let raw = RawSeries::from_pairs(vec![
            (NaiveDate::from_ymd_opt(2023, 11, 30).unwrap(), Some(99.0)),
            (NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(), Some(101.0)),
        ]);
        let series = DataCleaner::default().clean(&raw).unwrap();
        let table = month_end_table();

        let chart = ChartDataAssembler::assemble(&series, &table);

        assert_eq!(chart.historical.len(), 2);
        assert_eq!(chart.historical[1].value, 101.0);
        assert_eq!(chart.forecast.len(), table.len());
        for (band, row) in chart.forecast.iter().zip(table.rows()) {
            assert_eq!(band.date, row.date);
            assert_eq!(band.predicted, row.predicted);
            assert_eq!(band.lower, row.lower_bound);
            assert_eq!(band.upper, row.upper_bound);
        }
        assert!(chart.forecast.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_serializes_dates_as_iso() {
        let table = month_end_table();
        let raw = RawSeries::from_pairs(vec![(NaiveDate::from_ymd_opt(2023, 11, 30).unwrap(), Some(99.0))]);
        let series = DataCleaner::default().clean(&raw).unwrap();
        let json = serde_json::to_string(&ChartDataAssembler::assemble(&series, &table)).unwrap();
        assert!(json.contains("\"date\":\"2023-11-30\""));
        assert!(json.starts_with("{\"historical\":["));
    }
}
