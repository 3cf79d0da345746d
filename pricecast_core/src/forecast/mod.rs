pub mod forecast_engine;
pub mod forecast_table;
pub mod model;
pub mod model_config;
