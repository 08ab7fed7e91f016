use std::io;
use anyhow::Result;
use log::info;
use crate::initialization::init;
use crate::worker::{run, Outcome};

mod arima;
mod config;
mod daily;
mod errors;
mod forecasting;
mod initialization;
mod manager_cimis;
mod models;
mod plot;
mod report;
mod worker;

fn main() -> Result<()> {
    let config = init()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&config, &mut out)? {
        Outcome::Forecast(result) => info!("forecast done, MAE {:.3}°C", result.mae),
        Outcome::InsufficientData { len } => info!("forecast skipped, {} days available", len),
    }

    Ok(())
}
