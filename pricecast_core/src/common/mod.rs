pub mod enums;
pub mod forecast_error;
pub mod time;
