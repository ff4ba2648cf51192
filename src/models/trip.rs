use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::dates::output_timestamp;

/// One trip as delivered by the trip source.
///
/// The source sends most values as JSON strings; numbers are accepted too.
/// Absent and null fields are both `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTrip {
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub taxi_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_start_timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_end_timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_seconds: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_miles: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pickup_census_tract: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dropoff_census_tract: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pickup_community_area: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dropoff_community_area: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fare: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tips: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tolls: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub extras: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub trip_total: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pickup_centroid_latitude: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pickup_centroid_longitude: Option<String>,
    #[serde(default)]
    pub pickup_centroid_location: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dropoff_centroid_latitude: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dropoff_centroid_longitude: Option<String>,
    #[serde(default)]
    pub dropoff_centroid_location: Option<Value>,
}

/// A trip after column drops, row drops and renames; still carries the
/// payment type and company as text.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTrip {
    pub trip_id: String,
    pub taxi_id: String,
    pub trip_start_timestamp: NaiveDateTime,
    pub trip_end_timestamp: NaiveDateTime,
    pub trip_seconds: u64,
    pub trip_miles: f64,
    pub pickup_community_area_id: u32,
    pub dropoff_community_area_id: u32,
    pub fare: f64,
    pub tips: f64,
    pub tolls: f64,
    pub extras: f64,
    pub trip_total: f64,
    pub payment_type: String,
    pub company: String,
    pub pickup_centroid_latitude: f64,
    pub pickup_centroid_longitude: f64,
    pub dropoff_centroid_latitude: f64,
    pub dropoff_centroid_longitude: f64,
    pub datetime_for_weather: NaiveDateTime,
}

/// The persisted trip shape: text payment type and company replaced by
/// surrogate keys. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTrip {
    pub trip_id: String,
    pub taxi_id: String,
    #[serde(with = "output_timestamp")]
    pub trip_start_timestamp: NaiveDateTime,
    #[serde(with = "output_timestamp")]
    pub trip_end_timestamp: NaiveDateTime,
    pub trip_seconds: u64,
    pub trip_miles: f64,
    pub pickup_community_area_id: u32,
    pub dropoff_community_area_id: u32,
    pub fare: f64,
    pub tips: f64,
    pub tolls: f64,
    pub extras: f64,
    pub trip_total: f64,
    pub pickup_centroid_latitude: f64,
    pub pickup_centroid_longitude: f64,
    pub dropoff_centroid_latitude: f64,
    pub dropoff_centroid_longitude: f64,
    #[serde(with = "output_timestamp")]
    pub datetime_for_weather: NaiveDateTime,
    pub payment_type_id: u64,
    pub company_id: u64,
}

impl ResolvedTrip {
    pub fn from_clean(trip: CleanTrip, payment_type_id: u64, company_id: u64) -> Self {
        Self {
            trip_id: trip.trip_id,
            taxi_id: trip.taxi_id,
            trip_start_timestamp: trip.trip_start_timestamp,
            trip_end_timestamp: trip.trip_end_timestamp,
            trip_seconds: trip.trip_seconds,
            trip_miles: trip.trip_miles,
            pickup_community_area_id: trip.pickup_community_area_id,
            dropoff_community_area_id: trip.dropoff_community_area_id,
            fare: trip.fare,
            tips: trip.tips,
            tolls: trip.tolls,
            extras: trip.extras,
            trip_total: trip.trip_total,
            pickup_centroid_latitude: trip.pickup_centroid_latitude,
            pickup_centroid_longitude: trip.pickup_centroid_longitude,
            dropoff_centroid_latitude: trip.dropoff_centroid_latitude,
            dropoff_centroid_longitude: trip.dropoff_centroid_longitude,
            datetime_for_weather: trip.datetime_for_weather,
            payment_type_id,
            company_id,
        }
    }
}

/// Accept a JSON string, number or bool as text; null becomes `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a scalar value, found {}",
            other
        ))),
    }
}
