use std::io::Write;
use anyhow::{Context, Result};
use log::{info, warn};
use crate::config::Config;
use crate::daily::load_and_prepare;
use crate::forecasting::{forecast_window, ArimaForecaster};
use crate::models::forecast_result::ForecastResult;
use crate::plot::render_forecast;
use crate::report;

/// What a run ended up doing
#[derive(Debug)]
pub enum Outcome {
    Forecast(ForecastResult),
    InsufficientData { len: usize },
}

/// Loads the observations, forecasts the held out days if there is enough data, renders
/// the chart and writes the report to `out`
///
/// # Arguments
///
/// * 'config' - run configuration
/// * 'out' - where the report goes, normally stdout
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Outcome> {
    report::write_header(out, config.forecast.window_months)?;

    let series = load_and_prepare(config)
        .with_context(|| format!("loading observations from {}", config.files.input_file))?;

    let outcome = if series.len() >= config.forecast.min_days {
        let forecaster = ArimaForecaster::new(config.forecast.order());
        let result = forecast_window(&series, &config.forecast, &forecaster)
            .with_context(|| format!("forecasting with {}", config.forecast.order()))?;
        info!("MAE {:.3}", result.mae);

        render_forecast(&config.files.plot_file, &result)
            .with_context(|| format!("rendering chart to {}", config.files.plot_file))?;
        report::write_results(out, &result)?;

        Outcome::Forecast(result)
    } else {
        warn!("only {} days in window, {} needed", series.len(), config.forecast.min_days);
        report::write_insufficient(out, config.forecast.min_days, series.len())?;

        Outcome::InsufficientData { len: series.len() }
    };

    report::write_footer(out, &config.files.plot_file)?;

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use chrono::{Days, NaiveDate};
    use tempfile::tempdir;

    fn write_days(path: &std::path::Path, n: u64) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut csv = String::from("Stn Id,Date,Avg Air Temp (C)\n");
        for i in 0..n {
            csv.push_str(&format!("2,{},{:.1}\n", start + Days::new(i), 10.0 + (i % 5) as f64));
        }
        fs::write(path, csv).unwrap();
    }

    #[test]
    fn short_window_reports_and_skips_forecast() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("daily.csv");
        let plot = dir.path().join("2day_forecast.png");
        write_days(&input, 150);

        let mut config = Config::default();
        config.files.input_file = input.to_str().unwrap().to_string();
        config.files.plot_file = plot.to_str().unwrap().to_string();

        let mut out = Vec::new();
        let outcome = run(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(matches!(outcome, Outcome::InsufficientData { len: 150 }));
        assert!(text.contains("Need 180+ days (current: 150)\n"));
        assert!(!text.contains("FORECAST RESULTS"));
        assert!(text.starts_with("\n=== 6-MONTH TEMPERATURE FORECAST ===\n"));
        assert!(!plot.exists());
    }

    /// Three stations on a warming trend with xorshift noise, station 80 missing one day
    fn write_noisy_stations(path: &std::path::Path, n: u64) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut csv = String::from("Stn Id,Date,Avg Air Temp (C)\n");
        for i in 0..n {
            let base = 8.0 + 12.0 * (i as f64 / n as f64) + 3.0 * (i as f64 * 0.2).sin();
            for station in ["2", "80", "105"] {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let noise = (state % 2000) as f64 / 1000.0 - 1.0;
                if station == "80" && i == 100 {
                    csv.push_str(&format!("{},{},\n", station, start + Days::new(i)));
                } else {
                    csv.push_str(&format!("{},{},{:.1}\n", station, start + Days::new(i), base + noise));
                }
            }
        }
        fs::write(path, csv).unwrap();
    }

    #[test]
    fn long_window_forecasts_and_plots() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("daily.csv");
        let plot = dir.path().join("2day_forecast.png");
        write_noisy_stations(&input, 190);

        let mut config = Config::default();
        config.files.input_file = input.to_str().unwrap().to_string();
        config.files.plot_file = plot.to_str().unwrap().to_string();

        let mut out = Vec::new();
        let outcome = run(&config, &mut out).unwrap();
        let text = String::from_utf8(out.clone()).unwrap();

        let Outcome::Forecast(result) = outcome else {
            panic!("expected a forecast");
        };
        assert_eq!(result.points.len(), 2);
        assert!(result.mae.is_finite());
        assert!(plot.exists());

        assert!(text.contains("\n=== FORECAST RESULTS ===\n"));
        assert!(text.contains("Training Period: 2024-01-08 to 2024-07-06\n"));
        assert!(text.contains("Predicted Dates: 2024-07-07 to 2024-07-08\n"));
        let lines = text.lines()
            .filter(|l| l.contains("°C (Actual) → ") && l.ends_with("°C (Predicted)"))
            .count();
        assert_eq!(lines, 2);
        assert!(text.ends_with(&format!("\n=== VISUALIZATION SAVED TO {} ===\n", config.files.plot_file)));

        let mut again = Vec::new();
        run(&config, &mut again).unwrap();
        assert_eq!(out, again);
    }

    #[test]
    fn missing_input_fails() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.files.input_file = dir.path().join("daily.csv").to_str().unwrap().to_string();

        let mut out = Vec::new();
        assert!(run(&config, &mut out).is_err());
    }
}
