use serde_json::Value;

use crate::error::{EtlError, Result};
use crate::models::{RawTrip, WeatherResponse};

/// Parses the raw JSON blobs landed by the extraction run
pub struct RawReader;

impl RawReader {
    pub fn new() -> Self {
        Self
    }

    /// A trip payload must be a JSON array of objects
    pub fn read_trips(&self, bytes: &[u8]) -> Result<Vec<RawTrip>> {
        let value: Value = serde_json::from_slice(bytes)?;

        let Value::Array(items) = value else {
            return Err(EtlError::WrongShape {
                table: "raw trips".to_string(),
                expected: "array of trip objects".to_string(),
                found: describe(&value),
            });
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if !item.is_object() {
                    return Err(EtlError::WrongShape {
                        table: "raw trips".to_string(),
                        expected: "trip object".to_string(),
                        found: format!("{} at position {}", describe(&item), index),
                    });
                }
                Ok(serde_json::from_value(item)?)
            })
            .collect()
    }

    /// A weather payload must be an object with an `hourly` object
    pub fn read_weather(&self, bytes: &[u8]) -> Result<WeatherResponse> {
        let value: Value = serde_json::from_slice(bytes)?;

        match value.get("hourly") {
            Some(hourly) if hourly.is_object() => Ok(serde_json::from_value(value)?),
            Some(other) => Err(EtlError::WrongShape {
                table: "raw weather".to_string(),
                expected: "object field 'hourly'".to_string(),
                found: describe(other),
            }),
            None if value.is_object() => Err(EtlError::missing_column("raw weather", "hourly")),
            None => Err(EtlError::WrongShape {
                table: "raw weather".to_string(),
                expected: "object".to_string(),
                found: describe(&value),
            }),
        }
    }
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {} items", items.len()),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).take(5).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
    }
}
