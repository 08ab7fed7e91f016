use std::collections::{BTreeMap, HashSet};
use chrono::{Months, NaiveDate};
use log::{debug, info, warn};
use crate::config::Config;
use crate::errors::LoaderError;
use crate::manager_cimis::Cimis;
use crate::models::daily_series::{DailySeries, DailyTemp};
use crate::models::observation::Observation;

/// Loads observations and reduces them to the daily mean series for the trailing window
///
/// # Arguments
///
/// * 'config' - configuration holding input file, column names and window length
pub fn load_and_prepare(config: &Config) -> Result<DailySeries, LoaderError> {
    let cimis = Cimis::new(&config.files.input_file, &config.columns);
    let observations = cimis.read_observations()?;

    let stations = observations
        .iter()
        .filter_map(|o| o.station.as_deref())
        .collect::<HashSet<&str>>();
    info!("observations from {} station(s)", stations.len());

    let daily = aggregate_daily(&observations);
    let series = trailing_window(&daily, config.forecast.window_months)?;

    if series.is_empty() {
        warn!("no readings within the last {} months", config.forecast.window_months);
    } else {
        let days = series.days();
        info!("window {} to {}, {} days", days[0].date, days[days.len() - 1].date, series.len());
    }
    Ok(series)
}

/// Averages observations per date, ignoring missing readings.
///
/// Every date present in the input is returned, with None where no station had a reading.
///
/// # Arguments
///
/// * 'observations' - raw station observations in any order
pub fn aggregate_daily(observations: &[Observation]) -> Vec<(NaiveDate, Option<f64>)> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for o in observations {
        let entry = sums.entry(o.date).or_insert((0.0, 0));
        if let Some(t) = o.temperature {
            entry.0 += t;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(date, (sum, count))| (date, if count > 0 { Some(sum / count as f64) } else { None }))
        .collect()
}

/// Returns the first date kept by a window of `months` calendar months ending at `latest`.
/// Days past the end of a shorter target month clamp to its last day.
///
/// # Arguments
///
/// * 'latest' - the latest date in the data
/// * 'months' - window length in calendar months
pub fn window_start(latest: NaiveDate, months: u32) -> Option<NaiveDate> {
    latest.checked_sub_months(Months::new(months))
}

/// Keeps the dates on or after `window_start` of the latest date and drops days without
/// any reading.
///
/// The latest date is taken before dropping empty days.
///
/// # Arguments
///
/// * 'daily' - date ordered daily means as produced by aggregate_daily
/// * 'months' - window length in calendar months
pub fn trailing_window(daily: &[(NaiveDate, Option<f64>)], months: u32) -> Result<DailySeries, LoaderError> {
    let Some(latest) = daily.iter().map(|(d, _)| *d).max() else {
        return Ok(DailySeries::default());
    };
    let start = window_start(latest, months)
        .ok_or_else(|| LoaderError::Window(format!("can't go back {} months from {}", months, latest)))?;
    debug!("window cutoff {} (latest {})", start, latest);

    let days = daily
        .iter()
        .filter(|(d, _)| *d >= start)
        .filter_map(|(d, t)| t.map(|t| DailyTemp::new(*d, t)))
        .collect::<Vec<DailyTemp>>();

    DailySeries::try_from_days(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use approx::assert_relative_eq;
    use chrono::Days;
    use tempfile::NamedTempFile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn obs(date: NaiveDate, station: &str, temperature: Option<f64>) -> Observation {
        Observation { date, station: Some(station.to_string()), temperature }
    }

    #[test]
    fn same_day_stations_are_averaged() {
        let d = date(2024, 5, 1);
        let daily = aggregate_daily(&[obs(d, "2", Some(10.0)), obs(d, "80", Some(12.0))]);

        assert_eq!(daily.len(), 1);
        assert_relative_eq!(daily[0].1.unwrap(), 11.0);
    }

    #[test]
    fn missing_readings_are_left_out_of_the_mean() {
        let d = date(2024, 5, 1);
        let e = date(2024, 5, 2);
        let daily = aggregate_daily(&[
            obs(e, "2", None),
            obs(d, "2", Some(10.0)),
            obs(d, "80", None),
            obs(d, "6", Some(14.0)),
        ]);

        assert_eq!(daily, vec![(d, Some(12.0)), (e, None)]);
    }

    #[test]
    fn month_subtraction_clamps_to_month_end() {
        assert_eq!(window_start(date(2023, 8, 31), 6), Some(date(2023, 2, 28)));
        assert_eq!(window_start(date(2024, 8, 31), 6), Some(date(2024, 2, 29)));
        assert_eq!(window_start(date(2024, 7, 15), 6), Some(date(2024, 1, 15)));
    }

    #[test]
    fn window_is_inclusive_at_cutoff() {
        let latest = date(2024, 7, 15);
        let daily = vec![
            (date(2024, 1, 14), Some(1.0)),
            (date(2024, 1, 15), Some(2.0)),
            (latest, Some(3.0)),
        ];
        let series = trailing_window(&daily, 6).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.days()[0].date, date(2024, 1, 15));
    }

    #[test]
    fn empty_latest_day_still_sets_the_window() {
        let daily = vec![
            (date(2024, 1, 10), Some(1.0)),
            (date(2024, 1, 20), Some(2.0)),
            (date(2024, 7, 15), None),
        ];
        let series = trailing_window(&daily, 6).unwrap();

        assert_eq!(series.days(), &[DailyTemp::new(date(2024, 1, 20), 2.0)]);
    }

    #[test]
    fn no_data_gives_empty_series() {
        assert!(trailing_window(&[], 6).unwrap().is_empty());
    }

    #[test]
    fn trims_190_days_to_six_months() {
        let latest = date(2023, 6, 30);
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Stn Id,Date,Avg Air Temp (C)").unwrap();
        for i in (0..190u64).rev() {
            let d = latest - Days::new(i);
            writeln!(file, "2,{},{:.1}", d.format("%m/%d/%Y"), 10.0 + (i % 7) as f64).unwrap();
        }

        let mut config = Config::default();
        config.files.input_file = file.path().to_str().unwrap().to_string();
        let series = load_and_prepare(&config).unwrap();

        // 2022-12-30 through 2023-06-30
        let expected = (latest - date(2022, 12, 30)).num_days() as usize + 1;
        assert_eq!(series.len(), expected);
        assert_eq!(series.len(), 183);
        assert_eq!(series.days()[0].date, date(2022, 12, 30));
        assert_eq!(series.days()[series.len() - 1].date, latest);
    }

    #[test]
    fn duplicate_dates_collapse() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Stn Id,Date,Avg Air Temp (C)").unwrap();
        writeln!(file, "2,2024-03-01,10.0").unwrap();
        writeln!(file, "80,2024-03-01,12.0").unwrap();
        writeln!(file, "2,2024-03-02,9.0").unwrap();
        writeln!(file, "80,2024-03-02,").unwrap();

        let mut config = Config::default();
        config.files.input_file = file.path().to_str().unwrap().to_string();
        let series = load_and_prepare(&config).unwrap();

        assert_eq!(series.days(), &[
            DailyTemp::new(date(2024, 3, 1), 11.0),
            DailyTemp::new(date(2024, 3, 2), 9.0),
        ]);
    }
}
