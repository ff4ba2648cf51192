use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::dates::output_timestamp;

/// Archive API response: hourly measurements stored column-wise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub hourly: HourlySeries,
}

/// Parallel arrays, all co-indexed with `time`. A missing array is kept as
/// `None` so the shaper can report which field was absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Option<Vec<String>>,
    #[serde(default)]
    pub temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub wind_speed_10m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub precipitation: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub rain: Option<Vec<Option<f64>>>,
}

/// One hourly observation; field order is the CSV column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    #[serde(with = "output_timestamp")]
    pub datetime: NaiveDateTime,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation: Option<f64>,
    pub rain: Option<f64>,
}
