pub mod observation;
pub mod daily_series;
pub mod forecast_result;
