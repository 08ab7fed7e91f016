use chrono::NaiveDate;
use crate::models::daily_series::DailyTemp;

/// Actual and predicted temperature for one held-out day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub train_start: NaiveDate,
    pub train_end: NaiveDate,
    /// Last part of the training data, kept for the chart
    pub train_tail: Vec<DailyTemp>,
    pub points: Vec<ForecastPoint>,
    pub mae: f64,
}

impl ForecastResult {
    pub fn predicted_start(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn predicted_end(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}
