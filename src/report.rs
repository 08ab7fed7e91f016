use std::io::{self, Write};
use crate::models::forecast_result::ForecastResult;

/// Writes the opening banner
pub fn write_header<W: Write>(out: &mut W, window_months: u32) -> io::Result<()> {
    writeln!(out, "\n=== {}-MONTH TEMPERATURE FORECAST ===", window_months)
}

/// Writes training period, predicted period and actual against predicted for each day
///
/// # Arguments
///
/// * 'out' - where to write
/// * 'result' - the scored forecast
pub fn write_results<W: Write>(out: &mut W, result: &ForecastResult) -> io::Result<()> {
    writeln!(out, "\n=== FORECAST RESULTS ===")?;
    writeln!(out, "Training Period: {} to {}", result.train_start, result.train_end)?;
    if let (Some(start), Some(end)) = (result.predicted_start(), result.predicted_end()) {
        writeln!(out, "Predicted Dates: {} to {}", start, end)?;
    }
    for p in &result.points {
        writeln!(out, "{}: {:.1}°C (Actual) → {:.1}°C (Predicted)", p.date, p.actual, p.predicted)?;
    }

    Ok(())
}

/// Writes the line shown instead of results when the window is too short
///
/// # Arguments
///
/// * 'out' - where to write
/// * 'min_days' - days needed
/// * 'len' - days available
pub fn write_insufficient<W: Write>(out: &mut W, min_days: usize, len: usize) -> io::Result<()> {
    writeln!(out, "Need {}+ days (current: {})", min_days, len)
}

/// Writes the closing banner naming the chart file
pub fn write_footer<W: Write>(out: &mut W, plot_file: &str) -> io::Result<()> {
    writeln!(out, "\n=== VISUALIZATION SAVED TO {} ===", plot_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::forecast_result::ForecastPoint;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn results_block() {
        let result = ForecastResult {
            train_start: date(1, 15),
            train_end: date(7, 13),
            train_tail: vec![],
            points: vec![
                ForecastPoint { date: date(7, 14), actual: 24.36, predicted: 23.04 },
                ForecastPoint { date: date(7, 15), actual: 25.0, predicted: 19.96 },
            ],
            mae: 1.0,
        };
        let mut out = Vec::new();
        write_results(&mut out, &result).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(),
                   "\n=== FORECAST RESULTS ===\n\
                    Training Period: 2024-01-15 to 2024-07-13\n\
                    Predicted Dates: 2024-07-14 to 2024-07-15\n\
                    2024-07-14: 24.4°C (Actual) → 23.0°C (Predicted)\n\
                    2024-07-15: 25.0°C (Actual) → 20.0°C (Predicted)\n");
    }

    #[test]
    fn insufficient_line() {
        let mut out = Vec::new();
        write_insufficient(&mut out, 180, 150).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Need 180+ days (current: 150)\n");
    }

    #[test]
    fn banners() {
        let mut out = Vec::new();
        write_header(&mut out, 6).unwrap();
        write_footer(&mut out, "2day_forecast.png").unwrap();

        assert_eq!(String::from_utf8(out).unwrap(),
                   "\n=== 6-MONTH TEMPERATURE FORECAST ===\n\n=== VISUALIZATION SAVED TO 2day_forecast.png ===\n");
    }
}
