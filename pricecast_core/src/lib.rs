pub mod capacity;
pub mod chart;
pub mod clean;
pub mod common;
pub mod config;
pub mod forecast;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod query;
pub mod series;

pub use capacity::capacity_estimator::{estimate_capacity, Capacity, CapacityEstimator};
pub use chart::chart_data::{ChartData, ChartDataAssembler};
pub use clean::data_cleaner::DataCleaner;
pub use common::forecast_error::{ErrCode, ForecastError, ForecastResult};
pub use config::pipeline_config::PipelineConfig;
pub use forecast::{
    forecast_engine::ForecastEngine,
    forecast_table::{ForecastPoint, ForecastTable},
};
pub use io::series_reader::{read_series, ReadOptions};
pub use pipeline::pipeline::{Pipeline, PipelineResult};
pub use query::forecast_query::{ForecastQuery, QueryResult};
pub use series::observed_point::{CleanedSeries, ObservedPoint, RawSeries};
