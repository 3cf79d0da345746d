pub mod forecast_query;
