use std::env;
use log::info;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{load_config, Config, General, DEFAULT_CONFIG_FILE};
use crate::errors::InitError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Loads configuration and sets up logging
///
pub fn init() -> Result<Config, InitError> {
    let (config_path, required) = config_source(env::var("TEMPCAST_CONFIG").ok());
    let config = load_config(&config_path, required)?;

    setup_logging(&config.general)?;

    info!("tempcast version: {}", env!("CARGO_PKG_VERSION"));
    info!("configuration from {}", config_path);

    Ok(config)
}

/// Returns the config file to load and whether it must exist.
/// A path given through TEMPCAST_CONFIG must exist, the default file is optional.
///
/// # Arguments
///
/// * 'env_path' - value of TEMPCAST_CONFIG, if set
fn config_source(env_path: Option<String>) -> (String, bool) {
    match env_path {
        Some(path) => (path, true),
        None => (DEFAULT_CONFIG_FILE.to_string(), false),
    }
}

/// Builds the log4rs configuration.
///
/// Logs always go to stderr since stdout carries the report, and also to a file when
/// a log path is configured.
///
/// # Arguments
///
/// * 'general' - log level and optional log file
fn log_config(general: &General) -> Result<LogConfig, InitError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();

    let mut builder = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(log_path) = &general.log_path {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(log_path)?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    Ok(builder.build(root.build(general.log_level))?)
}

fn setup_logging(general: &General) -> Result<(), InitError> {
    let config = log_config(general)?;
    log4rs::init_config(config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;
    use tempfile::tempdir;

    #[test]
    fn explicit_config_path_is_required() {
        assert_eq!(config_source(Some("/etc/tempcast.toml".to_string())),
                   ("/etc/tempcast.toml".to_string(), true));
        assert_eq!(config_source(None), (DEFAULT_CONFIG_FILE.to_string(), false));

        let (path, required) = config_source(Some("/nonexistent/tempcast.toml".to_string()));
        assert!(load_config(&path, required).is_err());
    }

    #[test]
    fn stderr_only_by_default() {
        let config = log_config(&General::default()).unwrap();

        assert_eq!(config.appenders().len(), 1);
        assert_eq!(config.root().level(), LevelFilter::Warn);
    }

    #[test]
    fn file_appender_when_path_given() {
        let dir = tempdir().unwrap();
        let general = General {
            log_path: Some(dir.path().join("tempcast.log").to_str().unwrap().to_string()),
            log_level: LevelFilter::Info,
        };
        let config = log_config(&general).unwrap();

        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().appenders(), &["stderr".to_string(), "file".to_string()]);
    }
}
