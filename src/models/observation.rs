use chrono::NaiveDate;

/// One station's reading for one day, as found in the observation file
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub station: Option<String>,
    pub temperature: Option<f64>,
}
