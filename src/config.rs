use std::fs;
use std::path::Path;
use log::LevelFilter;
use serde::Deserialize;
use crate::arima::ArimaOrder;
use crate::errors::ConfigError;

/// Config file looked for in the working directory when TEMPCAST_CONFIG isn't set
pub const DEFAULT_CONFIG_FILE: &str = "tempcast.toml";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Files {
    pub input_file: String,
    pub plot_file: String,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            input_file: "daily.csv".to_string(),
            plot_file: "2day_forecast.png".to_string(),
        }
    }
}

/// Column headers in the observation file
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Columns {
    pub date: String,
    pub temperature: String,
    pub station: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            temperature: "Avg Air Temp (C)".to_string(),
            station: "Stn Id".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ForecastParameters {
    pub window_months: u32,
    pub min_days: usize,
    pub test_days: usize,
    pub plot_tail: usize,
    pub ar_order: usize,
    pub diff_order: usize,
    pub ma_order: usize,
}

impl Default for ForecastParameters {
    fn default() -> Self {
        Self {
            window_months: 6,
            min_days: 180,
            test_days: 2,
            plot_tail: 30,
            ar_order: 3,
            diff_order: 1,
            ma_order: 1,
        }
    }
}

impl ForecastParameters {
    pub fn order(&self) -> ArimaOrder {
        ArimaOrder::new(self.ar_order, self.diff_order, self.ma_order)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: LevelFilter,
}

impl Default for General {
    fn default() -> Self {
        Self { log_path: None, log_level: LevelFilter::Warn }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub files: Files,
    pub columns: Columns,
    pub forecast: ForecastParameters,
    pub general: General,
}

/// Loads the configuration file and returns a struct with all configuration items.
///
/// A missing optional file is not an error, every item then takes its default value.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
/// * 'required' - whether a missing file is an error
pub fn load_config(config_path: &str, required: bool) -> Result<Config, ConfigError> {
    if !Path::new(config_path).exists() {
        if required {
            return Err(ConfigError(format!("config file {} not found", config_path)));
        }
        return Ok(Config::default());
    }

    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;
    validate(&config)?;

    Ok(config)
}

/// Rejects parameter combinations the forecaster can't work with
///
/// # Arguments
///
/// * 'config' - configuration to check
fn validate(config: &Config) -> Result<(), ConfigError> {
    let fc = &config.forecast;
    if fc.test_days == 0 {
        return Err(ConfigError::from("test_days must be at least 1"));
    }
    if fc.window_months == 0 {
        return Err(ConfigError::from("window_months must be at least 1"));
    }
    if fc.min_days <= fc.test_days {
        return Err(ConfigError::from("min_days must exceed test_days"));
    }

    Ok(())
}
