use chrono::{Months, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{EtlError, Result};

/// Date the extraction run targets: `today` minus `lag_months` calendar months.
///
/// Month arithmetic clamps to the last valid day, so 2024-04-30 minus two
/// months is 2024-02-29.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use taxi_weather_etl::utils::dates::target_date;
///
/// let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(target_date(today, 2).unwrap(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// ```
pub fn target_date(today: NaiveDate, lag_months: u32) -> Result<NaiveDate> {
    today
        .checked_sub_months(Months::new(lag_months))
        .ok_or_else(|| {
            EtlError::InvalidFormat(format!(
                "Cannot subtract {} months from {}",
                lag_months, today
            ))
        })
}

/// Truncate a timestamp down to the start of its hour
pub fn floor_to_hour(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_minute(0))
        .unwrap_or(timestamp)
}

/// Parse a timestamp with the given format, naming the field in the error
pub fn parse_timestamp(value: &str, format: &str, field: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), format).map_err(|e| {
        EtlError::InvalidFormat(format!("Invalid {} '{}': {}", field, value, e))
    })
}

/// Serde adapter writing timestamps as `YYYY-MM-DD HH:MM:SS` in CSV output
pub mod output_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::constants::OUTPUT_TIMESTAMP_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(OUTPUT_TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, OUTPUT_TIMESTAMP_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::TRIP_TIMESTAMP_FORMAT;

    #[test]
    fn test_target_date_two_month_lag() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            target_date(today, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );

        // Crosses a year boundary
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(
            target_date(today, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 11, 10).unwrap()
        );
    }

    #[test]
    fn test_target_date_clamps_to_month_end() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 30).unwrap();
        assert_eq!(
            target_date(today, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_floor_to_hour() {
        let ts = parse_timestamp("2024-01-01T13:45:59.500", TRIP_TIMESTAMP_FORMAT, "ts").unwrap();
        let floored = floor_to_hour(ts);
        assert_eq!(floored.to_string(), "2024-01-01 13:00:00");

        // Already on the hour
        assert_eq!(floor_to_hour(floored), floored);
    }

    #[test]
    fn test_parse_timestamp_error_names_field() {
        let err = parse_timestamp("yesterday", TRIP_TIMESTAMP_FORMAT, "trip_start_timestamp")
            .unwrap_err();
        assert!(err.to_string().contains("trip_start_timestamp"));
    }
}
