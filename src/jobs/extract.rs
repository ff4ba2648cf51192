use bytes::Bytes;
use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::sources::ReferenceSource;
use crate::storage::{BucketStore, FileKind, StorageLayout};
use crate::utils::constants::{CONTENT_TYPE_JSON, DEFAULT_LAG_MONTHS};
use crate::utils::dates::target_date;

/// Keys written by one extraction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub date: NaiveDate,
    pub taxi_key: String,
    pub weather_key: String,
}

/// Pulls one day of trips and weather and lands both as raw JSON in the
/// incoming prefixes.
pub struct ExtractJob<'a> {
    source: &'a dyn ReferenceSource,
    store: &'a dyn BucketStore,
    layout: &'a StorageLayout,
    lag_months: u32,
}

impl<'a> ExtractJob<'a> {
    pub fn new(
        source: &'a dyn ReferenceSource,
        store: &'a dyn BucketStore,
        layout: &'a StorageLayout,
    ) -> Self {
        Self {
            source,
            store,
            layout,
            lag_months: DEFAULT_LAG_MONTHS,
        }
    }

    pub fn with_lag_months(mut self, lag_months: u32) -> Self {
        self.lag_months = lag_months;
        self
    }

    /// Extract the day `lag_months` before today
    pub async fn run(&self) -> Result<ExtractOutcome> {
        let date = target_date(Local::now().date_naive(), self.lag_months)?;
        self.run_for(date).await
    }

    /// Extract an explicit day. Both sources are fetched before anything is
    /// uploaded, so a failed fetch leaves the bucket untouched.
    pub async fn run_for(&self, date: NaiveDate) -> Result<ExtractOutcome> {
        info!(%date, "starting extraction");

        let trips = self.source.fetch_trips(date).await?;
        let weather = self.source.fetch_weather(date).await?;

        let taxi_key = self.upload(FileKind::Taxi, date, &trips).await?;
        let weather_key = self.upload(FileKind::Weather, date, &weather).await?;

        Ok(ExtractOutcome {
            date,
            taxi_key,
            weather_key,
        })
    }

    async fn upload(&self, kind: FileKind, date: NaiveDate, payload: &Value) -> Result<String> {
        let key = self.layout.raw_key(kind, date);
        let body = Bytes::from(serde_json::to_vec(payload)?);
        let size = body.len();

        self.store.put_object(&key, body, CONTENT_TYPE_JSON).await?;
        info!(key = %key, bytes = size, "uploaded raw {} data", kind);
        Ok(key)
    }
}
