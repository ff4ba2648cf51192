use serde::Serialize;

use crate::error::{EtlError, Result};
use crate::models::{MasterTable, ResolvedTrip, WeatherRecord};

/// Column order of transformed trip files
pub const TRIP_COLUMNS: [&str; 20] = [
    "trip_id",
    "taxi_id",
    "trip_start_timestamp",
    "trip_end_timestamp",
    "trip_seconds",
    "trip_miles",
    "pickup_community_area_id",
    "dropoff_community_area_id",
    "fare",
    "tips",
    "tolls",
    "extras",
    "trip_total",
    "pickup_centroid_latitude",
    "pickup_centroid_longitude",
    "dropoff_centroid_latitude",
    "dropoff_centroid_longitude",
    "datetime_for_weather",
    "payment_type_id",
    "company_id",
];

/// Column order of transformed weather files
pub const WEATHER_COLUMNS: [&str; 5] = ["datetime", "temperature", "wind_speed", "precipitation", "rain"];

/// Serializes tables to CSV bytes, always with a header row
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn write_trips(&self, trips: &[ResolvedTrip]) -> Result<Vec<u8>> {
        self.write_records(trips, &TRIP_COLUMNS)
    }

    pub fn write_weather(&self, records: &[WeatherRecord]) -> Result<Vec<u8>> {
        self.write_records(records, &WEATHER_COLUMNS)
    }

    pub fn write_master(&self, master: &MasterTable) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer.write_record([master.id_column(), master.value_column()])?;
        for row in master.rows() {
            writer.write_record([row.id.to_string().as_str(), row.value.as_str()])?;
        }

        finish(writer)
    }

    /// Serde-driven rows; the header comes from `columns` so an empty batch
    /// still produces a readable file
    fn write_records<T: Serialize>(&self, records: &[T], columns: &[&str]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(columns)?;
        for record in records {
            writer.serialize(record)?;
        }

        finish(writer)
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| EtlError::Io(e.into_error()))
}
