use chrono::{NaiveDate, TimeDelta};
use log::debug;
use plotters::prelude::*;
use crate::errors::PlotError;
use crate::models::forecast_result::ForecastResult;

/// A 10x5 inch figure at 120 dpi
pub const CHART_SIZE: (u32, u32) = (1200, 600);

/// Default line color for the training data, same as matplotlib's first cycle color
const TRAIN_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Chart coordinates, x is days since `origin`
#[derive(Debug, PartialEq)]
struct ChartData {
    origin: NaiveDate,
    train: Vec<(i32, f64)>,
    actual: Vec<(i32, f64)>,
    predicted: Vec<(i32, f64)>,
}

impl ChartData {
    fn from_result(result: &ForecastResult) -> Option<ChartData> {
        let origin = result.train_tail
            .first()
            .map(|d| d.date)
            .or(result.predicted_start())?;
        let x = |date: NaiveDate| (date - origin).num_days() as i32;

        Some(ChartData {
            origin,
            train: result.train_tail.iter().map(|d| (x(d.date), d.temp)).collect(),
            actual: result.points.iter().map(|p| (x(p.date), p.actual)).collect(),
            predicted: result.points.iter().map(|p| (x(p.date), p.predicted)).collect(),
        })
    }

    fn x_end(&self) -> i32 {
        self.train.iter()
            .chain(&self.actual)
            .map(|(x, _)| *x)
            .max()
            .unwrap_or(0)
    }

    /// Value range padded by a tenth on both sides, or one degree when flat
    fn y_range(&self) -> (f64, f64) {
        let (min, max) = self.train.iter()
            .chain(&self.actual)
            .chain(&self.predicted)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, y)| (lo.min(*y), hi.max(*y)));
        let pad = if (max - min).abs() > 1e-6 { (max - min) * 0.1 } else { 1.0 };

        (min - pad, max + pad)
    }
}

/// Second title line, below the chart name
fn mae_caption(mae: f64) -> String {
    format!("MAE: {:.1}°C", mae)
}

/// Renders training tail, actuals and forecasts to a png file, replacing any existing file
///
/// # Arguments
///
/// * 'path' - the png file to write
/// * 'result' - the scored forecast
pub fn render_forecast(path: &str, result: &ForecastResult) -> Result<(), PlotError> {
    let data = ChartData::from_result(result)
        .ok_or_else(|| PlotError("nothing to plot".to_string()))?;
    let (y_min, y_max) = data.y_range();
    let origin = data.origin;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("2-Day Temperature Forecast", ("sans-serif", 28))?;

    let mut chart = ChartBuilder::on(&area)
        .caption(mae_caption(result.mae), ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0..data.x_end() + 1, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Temperature (°C)")
        .x_label_formatter(&|v: &i32| {
            origin.checked_add_signed(TimeDelta::days(*v as i64))
                .map_or(String::new(), |d| d.format("%Y-%m-%d").to_string())
        })
        .light_line_style(BLACK.mix(0.1))
        .draw()?;

    chart
        .draw_series(LineSeries::new(data.train.iter().copied(), TRAIN_COLOR.stroke_width(2)))?
        .label(format!("Training (last {} days)", data.train.len()))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRAIN_COLOR.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(data.actual.iter().copied(), BLUE.stroke_width(2)))?
        .label("Actual")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
    chart.draw_series(data.actual.iter().map(|p| Circle::new(*p, 5, BLUE.filled())))?;

    chart
        .draw_series(LineSeries::new(data.predicted.iter().copied(), RED.stroke_width(2)))?
        .label("Forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    chart.draw_series(data.predicted.iter().map(|p| Circle::new(*p, 5, RED.filled())))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    debug!("chart written to {}", path);

    Ok(())
}
