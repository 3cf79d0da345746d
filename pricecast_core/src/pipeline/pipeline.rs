use std::path::Path;
use tracing::info;

use crate::capacity::capacity_estimator::{Capacity, CapacityEstimator};
use crate::chart::chart_data::{ChartData, ChartDataAssembler};
use crate::clean::data_cleaner::DataCleaner;
use crate::common::forecast_error::ForecastResult;
use crate::config::pipeline_config::PipelineConfig;
use crate::forecast::{forecast_engine::ForecastEngine, forecast_table::ForecastTable, model::Forecaster};
use crate::io::series_reader::{read_series, ReadOptions};
use crate::query::forecast_query::ForecastQuery;
use crate::series::observed_point::{CleanedSeries, RawSeries};

/// Everything one run produces. Immutable once returned.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub cleaned: CleanedSeries,
    pub capacity: Capacity,
    pub table: ForecastTable,
}

impl PipelineResult {
    pub fn query(&self) -> ForecastQuery<'_> {
        ForecastQuery::new(&self.table)
    }

    pub fn chart_data(&self) -> ChartData {
        ChartDataAssembler::assemble(&self.cleaned, &self.table)
    }
}

/// clean -> capacity -> fit -> predict, failing fast at the first error.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    cleaner: DataCleaner,
    estimator: CapacityEstimator,
    engine: ForecastEngine,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> ForecastResult<Self> {
        let engine = ForecastEngine::new(config.model_conf.clone())?;
        Self::build(config, engine)
    }

    pub fn with_forecaster(config: PipelineConfig, forecaster: Box<dyn Forecaster>) -> ForecastResult<Self> {
        let engine = ForecastEngine::with_forecaster(config.model_conf.clone(), forecaster)?;
        Self::build(config, engine)
    }

    fn build(config: PipelineConfig, engine: ForecastEngine) -> ForecastResult<Self> {
        config.validate()?;
        Ok(Self {
            cleaner: DataCleaner::new(config.clean_conf.clone()),
            estimator: CapacityEstimator::new(config.growth_margin)?,
            engine,
            config,
        })
    }

    pub fn run(&self, raw: &RawSeries) -> ForecastResult<PipelineResult> {
        let cleaned = self.cleaner.clean(raw)?;
        let capacity = self.estimator.estimate(&cleaned)?;
        let model = self.engine.fit(&cleaned, capacity)?;
        let table = self.engine.predict(model.as_ref(), capacity, self.config.forecast_horizon)?;

        info!(
            "pipeline done: {} observations, capacity {}, {} forecast rows",
            cleaned.len(),
            capacity,
            table.len()
        );
        Ok(PipelineResult {
            cleaned,
            capacity,
            table,
        })
    }

    pub fn run_file(&self, path: impl AsRef<Path>, opts: &ReadOptions) -> ForecastResult<PipelineResult> {
        let raw = read_series(path, opts)?;
        self.run(&raw)
    }
}
