use log::info;
use crate::arima::{Arima, ArimaOrder};
use crate::config::ForecastParameters;
use crate::errors::{ForecastError, ModelError};
use crate::models::daily_series::{temps, DailySeries, DailyTemp};
use crate::models::forecast_result::{ForecastPoint, ForecastResult};

/// Anything that can be fitted on a training series and forecast ahead of it
pub trait Forecaster {
    /// Fits on the training days and returns `steps` values following the last of them
    ///
    /// # Arguments
    ///
    /// * 'train' - training days in date order
    /// * 'steps' - number of days to forecast
    fn fit_and_forecast(&self, train: &[DailyTemp], steps: usize) -> Result<Vec<f64>, ModelError>;
}

/// Forecaster backed by an ARIMA model of fixed order
pub struct ArimaForecaster {
    order: ArimaOrder,
}

impl ArimaForecaster {
    pub fn new(order: ArimaOrder) -> ArimaForecaster {
        ArimaForecaster { order }
    }
}

impl Forecaster for ArimaForecaster {
    fn fit_and_forecast(&self, train: &[DailyTemp], steps: usize) -> Result<Vec<f64>, ModelError> {
        let model = Arima::fit(&temps(train), self.order)?;
        info!("{}", model.summary());

        Ok(model.forecast(steps))
    }
}

/// Mean of the absolute differences between actual and predicted values
///
/// # Arguments
///
/// * 'actual' - observed values
/// * 'predicted' - forecasted values, same length as actual
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> Result<f64, ForecastError> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(ForecastError::Metric(
            format!("can't score {} predictions against {} actuals", predicted.len(), actual.len())));
    }
    let total = actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()).sum::<f64>();

    Ok(total / actual.len() as f64)
}

/// Holds out the last days of the series, forecasts them from the rest and scores the result
///
/// # Arguments
///
/// * 'series' - the windowed daily series
/// * 'params' - test length and plot tail length
/// * 'forecaster' - the model to use
pub fn forecast_window(series: &DailySeries, params: &ForecastParameters, forecaster: &dyn Forecaster)
    -> Result<ForecastResult, ForecastError> {

    let split = series.split(params.test_days)?;
    let predicted = forecaster.fit_and_forecast(split.train, split.test.len())?;
    if predicted.len() != split.test.len() {
        return Err(ForecastError::Horizon { expected: split.test.len(), actual: predicted.len() });
    }

    let mae = mean_absolute_error(&temps(split.test), &predicted)?;

    let points = split.test
        .iter()
        .zip(&predicted)
        .map(|(d, p)| ForecastPoint { date: d.date, actual: d.temp, predicted: *p })
        .collect::<Vec<ForecastPoint>>();

    let tail_start = split.train.len().saturating_sub(params.plot_tail);

    Ok(ForecastResult {
        train_start: split.train[0].date,
        train_end: split.train[split.train.len() - 1].date,
        train_tail: split.train[tail_start..].to_vec(),
        points,
        mae,
    })
}
