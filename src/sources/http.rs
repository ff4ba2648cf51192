//! HTTP client for the trip (Chicago data portal) and weather (Open-Meteo)
//! APIs.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::ReferenceSource;
use crate::config::SourceSettings;
use crate::error::Result;
use crate::utils::constants::{FILE_DATE_FORMAT, TAXI_API_TOKEN_HEADER};

pub struct HttpReferenceSource {
    client: Client,
    settings: SourceSettings,
    api_token: Option<String>,
}

impl HttpReferenceSource {
    pub fn new(settings: SourceSettings, api_token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            settings,
            api_token,
        })
    }

    /// Query parameters selecting every trip that started on `date`
    pub fn trip_query(&self, date: NaiveDate) -> Vec<(String, String)> {
        let day = date.format(FILE_DATE_FORMAT);
        vec![
            (
                "$where".to_string(),
                format!(
                    "trip_start_timestamp >= '{day}T00:00:00.000' AND trip_start_timestamp <= '{day}T23:59:59.000'"
                ),
            ),
            ("$limit".to_string(), self.settings.trips.limit.to_string()),
        ]
    }

    /// Query parameters for the hourly archive of a single day
    pub fn weather_query(&self, date: NaiveDate) -> Vec<(String, String)> {
        let day = date.format(FILE_DATE_FORMAT).to_string();
        let weather = &self.settings.weather;
        vec![
            ("latitude".to_string(), weather.latitude.to_string()),
            ("longitude".to_string(), weather.longitude.to_string()),
            ("start_date".to_string(), day.clone()),
            ("end_date".to_string(), day),
            ("hourly".to_string(), weather.hourly_fields.clone()),
        ]
    }
}

#[async_trait]
impl ReferenceSource for HttpReferenceSource {
    async fn fetch_trips(&self, date: NaiveDate) -> Result<Value> {
        let url = &self.settings.trips.url;
        debug!(url = %url, %date, "requesting trips");

        let mut request = self.client.get(url).query(&self.trip_query(date));
        if let Some(token) = &self.api_token {
            request = request.header(TAXI_API_TOKEN_HEADER, token);
        }

        let response = request.send().await?.error_for_status()?;
        let payload: Value = response.json().await?;

        let count = payload.as_array().map(Vec::len).unwrap_or(0);
        info!(%date, trips = count, "fetched trip data");
        Ok(payload)
    }

    async fn fetch_weather(&self, date: NaiveDate) -> Result<Value> {
        let url = &self.settings.weather.url;
        debug!(url = %url, %date, "requesting weather");

        let response = self
            .client
            .get(url)
            .query(&self.weather_query(date))
            .send()
            .await?
            .error_for_status()?;
        let payload: Value = response.json().await?;

        info!(%date, "fetched weather data");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> HttpReferenceSource {
        HttpReferenceSource::new(SourceSettings::default(), None).unwrap()
    }

    #[test]
    fn test_trip_query_covers_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let query = source().trip_query(date);

        assert_eq!(query[0].0, "$where");
        assert_eq!(
            query[0].1,
            "trip_start_timestamp >= '2024-01-31T00:00:00.000' AND trip_start_timestamp <= '2024-01-31T23:59:59.000'"
        );
        assert_eq!(query[1], ("$limit".to_string(), "30000".to_string()));
    }

    #[test]
    fn test_weather_query() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let query = source().weather_query(date);

        assert!(query.contains(&("latitude".to_string(), "41.85".to_string())));
        assert!(query.contains(&("longitude".to_string(), "-87.65".to_string())));
        assert!(query.contains(&("start_date".to_string(), "2024-01-31".to_string())));
        assert!(query.contains(&("end_date".to_string(), "2024-01-31".to_string())));
        assert!(query.contains(&(
            "hourly".to_string(),
            "temperature_2m,wind_speed_10m,precipitation,rain".to_string()
        )));
    }
}
