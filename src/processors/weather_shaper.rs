use crate::error::{EtlError, Result};
use crate::models::{HourlySeries, WeatherRecord, WeatherResponse};
use crate::utils::constants::WEATHER_TIMESTAMP_FORMAT;
use crate::utils::dates::parse_timestamp;

const HOURLY_TABLE: &str = "weather hourly series";

/// Flatten the column-wise hourly response into one record per timestamp.
///
/// Every measurement array must be present and as long as `time`. Null
/// measurements are kept as `None`.
pub fn shape(response: WeatherResponse) -> Result<Vec<WeatherRecord>> {
    let HourlySeries {
        time,
        temperature_2m,
        wind_speed_10m,
        precipitation,
        rain,
    } = response.hourly;

    let time = require(time, "time")?;
    let expected = time.len();

    let temperature = require_aligned(temperature_2m, "temperature_2m", expected)?;
    let wind_speed = require_aligned(wind_speed_10m, "wind_speed_10m", expected)?;
    let precipitation = require_aligned(precipitation, "precipitation", expected)?;
    let rain = require_aligned(rain, "rain", expected)?;

    time.iter()
        .zip(temperature)
        .zip(wind_speed)
        .zip(precipitation)
        .zip(rain)
        .map(|((((timestamp, temperature), wind_speed), precipitation), rain)| {
            Ok(WeatherRecord {
                datetime: parse_timestamp(timestamp, WEATHER_TIMESTAMP_FORMAT, "time")?,
                temperature,
                wind_speed,
                precipitation,
                rain,
            })
        })
        .collect()
}

fn require<T>(field: Option<Vec<T>>, name: &str) -> Result<Vec<T>> {
    field.ok_or_else(|| EtlError::missing_column(HOURLY_TABLE, name))
}

fn require_aligned<T>(field: Option<Vec<T>>, name: &str, expected: usize) -> Result<Vec<T>> {
    let values = require(field, name)?;
    if values.len() != expected {
        return Err(EtlError::WeatherShape {
            field: name.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(values)
}
