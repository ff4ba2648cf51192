use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::work_queue::FileKind;
use crate::models::MasterKind;
use crate::utils::constants::*;
use crate::utils::filename::{
    master_file_name, master_previous_file_name, raw_file_name, transformed_file_name,
};

/// Where each stage reads and writes inside the bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StorageLayout {
    #[validate(custom(function = "validate_prefix"))]
    pub raw_taxi_incoming: String,
    #[validate(custom(function = "validate_prefix"))]
    pub raw_weather_incoming: String,
    #[validate(custom(function = "validate_prefix"))]
    pub raw_taxi_processed: String,
    #[validate(custom(function = "validate_prefix"))]
    pub raw_weather_processed: String,
    #[validate(custom(function = "validate_prefix"))]
    pub transformed_taxi: String,
    #[validate(custom(function = "validate_prefix"))]
    pub transformed_weather: String,
    #[validate(custom(function = "validate_prefix"))]
    pub payment_type_master: String,
    #[validate(custom(function = "validate_prefix"))]
    pub company_master: String,
    #[validate(custom(function = "validate_prefix"))]
    pub master_previous_version: String,
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self {
            raw_taxi_incoming: RAW_TAXI_INCOMING_PREFIX.to_string(),
            raw_weather_incoming: RAW_WEATHER_INCOMING_PREFIX.to_string(),
            raw_taxi_processed: RAW_TAXI_PROCESSED_PREFIX.to_string(),
            raw_weather_processed: RAW_WEATHER_PROCESSED_PREFIX.to_string(),
            transformed_taxi: TRANSFORMED_TAXI_PREFIX.to_string(),
            transformed_weather: TRANSFORMED_WEATHER_PREFIX.to_string(),
            payment_type_master: PAYMENT_TYPE_MASTER_PREFIX.to_string(),
            company_master: COMPANY_MASTER_PREFIX.to_string(),
            master_previous_version: MASTER_PREVIOUS_VERSION_PREFIX.to_string(),
        }
    }
}

impl StorageLayout {
    pub fn incoming_prefix(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Taxi => &self.raw_taxi_incoming,
            FileKind::Weather => &self.raw_weather_incoming,
        }
    }

    pub fn processed_prefix(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Taxi => &self.raw_taxi_processed,
            FileKind::Weather => &self.raw_weather_processed,
        }
    }

    pub fn transformed_prefix(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Taxi => &self.transformed_taxi,
            FileKind::Weather => &self.transformed_weather,
        }
    }

    pub fn raw_key(&self, kind: FileKind, date: NaiveDate) -> String {
        format!(
            "{}{}",
            self.incoming_prefix(kind),
            raw_file_name(kind.file_type(), date)
        )
    }

    pub fn transformed_key(&self, kind: FileKind, date: NaiveDate) -> String {
        format!(
            "{}{}",
            self.transformed_prefix(kind),
            transformed_file_name(kind.file_type(), date)
        )
    }

    pub fn processed_key(&self, kind: FileKind, file_name: &str) -> String {
        format!("{}{}", self.processed_prefix(kind), file_name)
    }

    pub fn master_key(&self, kind: MasterKind) -> String {
        let prefix = match kind {
            MasterKind::PaymentType => &self.payment_type_master,
            MasterKind::Company => &self.company_master,
        };
        format!("{}{}", prefix, master_file_name(kind.value_column()))
    }

    pub fn master_previous_key(&self, kind: MasterKind) -> String {
        format!(
            "{}{}",
            self.master_previous_version,
            master_previous_file_name(kind.value_column())
        )
    }
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.is_empty() || !prefix.ends_with('/') || prefix.starts_with('/') {
        return Err(ValidationError::new("prefix_must_be_relative_and_end_with_slash"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys() {
        let layout = StorageLayout::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert_eq!(
            layout.raw_key(FileKind::Taxi, date),
            "raw_data/to_processed/taxi_data/taxi_raw_2024-01-31.json"
        );
        assert_eq!(
            layout.transformed_key(FileKind::Weather, date),
            "transformed_data/weather/weather_2024-01-31.csv"
        );
        assert_eq!(
            layout.processed_key(FileKind::Weather, "weather_raw_2024-01-31.json"),
            "raw_data/processed/weather_data/weather_raw_2024-01-31.json"
        );
        assert_eq!(
            layout.master_key(MasterKind::PaymentType),
            "transformed_data/payment_type/payment_type_master.csv"
        );
        assert_eq!(
            layout.master_previous_key(MasterKind::Company),
            "transformed_data/master_table_previous_version/company_master_previous_version.csv"
        );
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_invalid_prefix() {
        let layout = StorageLayout {
            transformed_taxi: "transformed_data/taxi_trips".to_string(),
            ..StorageLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
