pub mod csv_writer;

pub use csv_writer::{CsvWriter, TRIP_COLUMNS, WEATHER_COLUMNS};
