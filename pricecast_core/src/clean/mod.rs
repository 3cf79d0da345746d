pub mod clean_config;
pub mod data_cleaner;
