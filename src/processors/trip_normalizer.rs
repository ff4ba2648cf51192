use std::str::FromStr;

use crate::error::{EtlError, Result};
use crate::models::{CleanTrip, RawTrip};
use crate::utils::constants::TRIP_TIMESTAMP_FORMAT;
use crate::utils::dates::{floor_to_hour, parse_timestamp};

/// Cleans raw trip batches.
///
/// Census tract and centroid location columns are discarded. A row missing
/// any retained value is dropped whole; nothing is imputed. Community areas
/// are renamed to `*_id` and `datetime_for_weather` is the trip start floored
/// to the hour.
pub struct TripNormalizer {
    timestamp_format: String,
}

impl TripNormalizer {
    pub fn new() -> Self {
        Self {
            timestamp_format: TRIP_TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn normalize(&self, raw_trips: Vec<RawTrip>) -> Result<Vec<CleanTrip>> {
        let mut cleaned = Vec::with_capacity(raw_trips.len());

        for raw in raw_trips {
            if let Some(trip) = self.normalize_trip(raw)? {
                cleaned.push(trip);
            }
        }

        Ok(cleaned)
    }

    /// `Ok(None)` when the row is incomplete, an error when a present value
    /// cannot be parsed
    fn normalize_trip(&self, raw: RawTrip) -> Result<Option<CleanTrip>> {
        let RawTrip {
            trip_id,
            taxi_id,
            trip_start_timestamp,
            trip_end_timestamp,
            trip_seconds,
            trip_miles,
            pickup_community_area,
            dropoff_community_area,
            fare,
            tips,
            tolls,
            extras,
            trip_total,
            payment_type,
            company,
            pickup_centroid_latitude,
            pickup_centroid_longitude,
            dropoff_centroid_latitude,
            dropoff_centroid_longitude,
            ..
        } = raw;

        let (
            Some(trip_id),
            Some(taxi_id),
            Some(trip_start_timestamp),
            Some(trip_end_timestamp),
            Some(trip_seconds),
            Some(trip_miles),
            Some(pickup_community_area),
            Some(dropoff_community_area),
            Some(fare),
            Some(tips),
            Some(tolls),
            Some(extras),
            Some(trip_total),
            Some(payment_type),
            Some(company),
            Some(pickup_centroid_latitude),
            Some(pickup_centroid_longitude),
            Some(dropoff_centroid_latitude),
            Some(dropoff_centroid_longitude),
        ) = (
            present(trip_id),
            present(taxi_id),
            present(trip_start_timestamp),
            present(trip_end_timestamp),
            present(trip_seconds),
            present(trip_miles),
            present(pickup_community_area),
            present(dropoff_community_area),
            present(fare),
            present(tips),
            present(tolls),
            present(extras),
            present(trip_total),
            present(payment_type),
            present(company),
            present(pickup_centroid_latitude),
            present(pickup_centroid_longitude),
            present(dropoff_centroid_latitude),
            present(dropoff_centroid_longitude),
        )
        else {
            return Ok(None);
        };

        let start = parse_timestamp(&trip_start_timestamp, &self.timestamp_format, "trip_start_timestamp")?;
        let end = parse_timestamp(&trip_end_timestamp, &self.timestamp_format, "trip_end_timestamp")?;

        let trip = CleanTrip {
            trip_seconds: parse_whole(&trip_seconds, "trip_seconds", &trip_id)?,
            trip_miles: parse_field(&trip_miles, "trip_miles", &trip_id)?,
            pickup_community_area_id: parse_whole(&pickup_community_area, "pickup_community_area", &trip_id)?,
            dropoff_community_area_id: parse_whole(&dropoff_community_area, "dropoff_community_area", &trip_id)?,
            fare: parse_field(&fare, "fare", &trip_id)?,
            tips: parse_field(&tips, "tips", &trip_id)?,
            tolls: parse_field(&tolls, "tolls", &trip_id)?,
            extras: parse_field(&extras, "extras", &trip_id)?,
            trip_total: parse_field(&trip_total, "trip_total", &trip_id)?,
            pickup_centroid_latitude: parse_field(&pickup_centroid_latitude, "pickup_centroid_latitude", &trip_id)?,
            pickup_centroid_longitude: parse_field(&pickup_centroid_longitude, "pickup_centroid_longitude", &trip_id)?,
            dropoff_centroid_latitude: parse_field(&dropoff_centroid_latitude, "dropoff_centroid_latitude", &trip_id)?,
            dropoff_centroid_longitude: parse_field(&dropoff_centroid_longitude, "dropoff_centroid_longitude", &trip_id)?,
            trip_start_timestamp: start,
            trip_end_timestamp: end,
            datetime_for_weather: floor_to_hour(start),
            payment_type: payment_type.trim().to_string(),
            company: company.trim().to_string(),
            taxi_id,
            trip_id,
        };

        Ok(Some(trip))
    }
}

impl Default for TripNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Blank strings count as missing
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_field<T: FromStr>(value: &str, field: &str, trip_id: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        EtlError::InvalidFormat(format!(
            "Invalid {} '{}' in trip {}",
            field, value, trip_id
        ))
    })
}

/// Integer column that may arrive as "600" or "600.0"
fn parse_whole<T: FromStr + TryFrom<u64>>(value: &str, field: &str, trip_id: &str) -> Result<T> {
    if let Ok(parsed) = value.trim().parse::<T>() {
        return Ok(parsed);
    }

    let float: f64 = parse_field(value, field, trip_id)?;
    if float.fract() != 0.0 || float < 0.0 {
        return Err(EtlError::InvalidFormat(format!(
            "Expected a whole number for {} in trip {}, got '{}'",
            field, trip_id, value
        )));
    }

    T::try_from(float as u64).map_err(|_| {
        EtlError::InvalidFormat(format!(
            "{} out of range in trip {}: '{}'",
            field, trip_id, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_trip(trip_id: &str) -> RawTrip {
        serde_json::from_value(json!({
            "trip_id": trip_id,
            "taxi_id": "taxi-1",
            "trip_start_timestamp": "2024-01-15T13:45:00.000",
            "trip_end_timestamp": "2024-01-15T14:05:00.000",
            "trip_seconds": "1200",
            "trip_miles": "5.3",
            "pickup_census_tract": "17031081500",
            "dropoff_census_tract": "17031320100",
            "pickup_community_area": "8",
            "dropoff_community_area": "32",
            "fare": "17.75",
            "tips": "4",
            "tolls": "0",
            "extras": "1.5",
            "trip_total": "23.25",
            "payment_type": "Credit Card",
            "company": "Flash Cab",
            "pickup_centroid_latitude": "41.899602111",
            "pickup_centroid_longitude": "-87.633308037",
            "pickup_centroid_location": {"type": "Point", "coordinates": [-87.633308037, 41.899602111]},
            "dropoff_centroid_latitude": "41.884987192",
            "dropoff_centroid_longitude": "-87.620992913",
            "dropoff_centroid_location": {"type": "Point", "coordinates": [-87.620992913, 41.884987192]}
        }))
        .unwrap()
    }

    #[test]
    fn test_complete_row_is_cleaned() {
        let normalizer = TripNormalizer::new();
        let trips = normalizer.normalize(vec![raw_trip("t1")]).unwrap();

        assert_eq!(trips.len(), 1);
        let trip = &trips[0];
        assert_eq!(trip.trip_id, "t1");
        assert_eq!(trip.pickup_community_area_id, 8);
        assert_eq!(trip.dropoff_community_area_id, 32);
        assert_eq!(trip.trip_seconds, 1200);
        assert_eq!(trip.fare, 17.75);
        assert_eq!(trip.payment_type, "Credit Card");
        assert_eq!(trip.datetime_for_weather.to_string(), "2024-01-15 13:00:00");
    }

    #[test]
    fn test_dropped_columns_do_not_affect_completeness() {
        let mut raw = raw_trip("t1");
        raw.pickup_census_tract = None;
        raw.dropoff_centroid_location = None;

        let trips = TripNormalizer::new().normalize(vec![raw]).unwrap();
        assert_eq!(trips.len(), 1);
    }

    #[test]
    fn test_incomplete_rows_dropped() {
        let mut missing_company = raw_trip("t2");
        missing_company.company = None;
        let mut blank_tips = raw_trip("t3");
        blank_tips.tips = Some("  ".to_string());

        let trips = TripNormalizer::new()
            .normalize(vec![raw_trip("t1"), missing_company, blank_tips, raw_trip("t4")])
            .unwrap();

        let ids: Vec<&str> = trips.iter().map(|t| t.trip_id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t4"]);
    }

    #[test]
    fn test_all_rows_incomplete_gives_empty_batch() {
        let mut a = raw_trip("a");
        a.trip_miles = None;
        let mut b = raw_trip("b");
        b.dropoff_community_area = None;

        let trips = TripNormalizer::new().normalize(vec![a, b]).unwrap();
        assert!(trips.is_empty());
    }

    #[test]
    fn test_whole_numbers_with_fraction_suffix() {
        let mut raw = raw_trip("t1");
        raw.trip_seconds = Some("600.0".to_string());
        let trips = TripNormalizer::new().normalize(vec![raw]).unwrap();
        assert_eq!(trips[0].trip_seconds, 600);

        let mut raw = raw_trip("t2");
        raw.trip_seconds = Some("600.5".to_string());
        assert!(TripNormalizer::new().normalize(vec![raw]).is_err());
    }

    #[test]
    fn test_unparseable_value_is_an_error() {
        let mut raw = raw_trip("bad");
        raw.fare = Some("twelve".to_string());

        let err = TripNormalizer::new().normalize(vec![raw]).unwrap_err();
        assert!(err.to_string().contains("fare"));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_natural_keys_are_trimmed() {
        let mut raw = raw_trip("t1");
        raw.payment_type = Some(" Cash ".to_string());
        raw.company = Some("Flash Cab ".to_string());

        let trips = TripNormalizer::new().normalize(vec![raw]).unwrap();
        assert_eq!(trips[0].payment_type, "Cash");
        assert_eq!(trips[0].company, "Flash Cab");
    }
}
