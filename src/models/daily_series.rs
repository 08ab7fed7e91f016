use chrono::NaiveDate;
use crate::errors::{ForecastError, LoaderError};

/// Mean temperature over all reporting stations for one day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTemp {
    pub date: NaiveDate,
    pub temp: f64,
}

impl DailyTemp {
    pub fn new(date: NaiveDate, temp: f64) -> DailyTemp {
        DailyTemp { date, temp }
    }
}

/// Daily mean temperatures ordered by date, at most one entry per date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    days: Vec<DailyTemp>,
}

/// Chronological train/test partition of a series
#[derive(Debug, Clone, Copy)]
pub struct Split<'a> {
    pub train: &'a [DailyTemp],
    pub test: &'a [DailyTemp],
}

impl DailySeries {
    /// Returns a series from days already in date order
    ///
    /// # Arguments
    ///
    /// * 'days' - daily values, dates must be strictly increasing
    pub fn try_from_days(days: Vec<DailyTemp>) -> Result<DailySeries, LoaderError> {
        if let Some(w) = days.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(LoaderError::Window(
                format!("dates out of order or repeated: {} followed by {}", w[0].date, w[1].date)));
        }

        Ok(DailySeries { days })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn days(&self) -> &[DailyTemp] {
        &self.days
    }

    /// Splits off the last `test_len` days as test set, everything before is training data
    ///
    /// # Arguments
    ///
    /// * 'test_len' - number of trailing days to hold out
    pub fn split(&self, test_len: usize) -> Result<Split<'_>, ForecastError> {
        if test_len == 0 || self.days.len() <= test_len {
            return Err(ForecastError::Split { len: self.days.len(), test_len });
        }
        let (train, test) = self.days.split_at(self.days.len() - test_len);

        Ok(Split { train, test })
    }
}

/// Temperatures of the given days, in order
pub fn temps(days: &[DailyTemp]) -> Vec<f64> {
    days.iter().map(|d| d.temp).collect()
}
