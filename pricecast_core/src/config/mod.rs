pub mod config_with_check;
pub mod pipeline_config;
