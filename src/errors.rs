use thiserror::Error;
use crate::manager_cimis::CimisError;

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self { ConfigError(e.to_string()) }
}
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self { ConfigError(e.to_string()) }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self { ConfigError(e.to_string()) }
}

#[derive(Error, Debug)]
#[error("InitError: {0}")]
pub struct InitError(pub String);
impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self { InitError(e.to_string()) }
}
impl From<std::io::Error> for InitError {
    fn from(e: std::io::Error) -> Self { InitError(format!("log file: {}", e)) }
}
impl From<log4rs::config::runtime::ConfigErrors> for InitError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self { InitError(e.to_string()) }
}
impl From<log::SetLoggerError> for InitError {
    fn from(e: log::SetLoggerError) -> Self { InitError(e.to_string()) }
}

/// Errors from turning raw observations into a daily series
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("LoaderError::Source: {0}")]
    Source(#[from] CimisError),
    #[error("LoaderError::Window: {0}")]
    Window(String),
}

/// Errors from fitting a model
#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("ModelError::InsufficientData: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("ModelError::InvalidData: {0}")]
    InvalidData(String),
    #[error("ModelError::Degenerate: {0}")]
    Degenerate(String),
    #[error("ModelError::NotConverged: {0}")]
    NotConverged(String),
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("ForecastError::Split: series of {len} points cannot hold a test set of {test_len}")]
    Split { len: usize, test_len: usize },
    #[error("ForecastError::Model: {0}")]
    Model(#[from] ModelError),
    #[error("ForecastError::Horizon: expected {expected} predictions, got {actual}")]
    Horizon { expected: usize, actual: usize },
    #[error("ForecastError::Metric: {0}")]
    Metric(String),
}

#[derive(Error, Debug)]
#[error("PlotError: {0}")]
pub struct PlotError(pub String);
impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>> for PlotError {
    fn from(e: plotters::drawing::DrawingAreaErrorKind<E>) -> Self { PlotError(e.to_string()) }
}
