pub mod http;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;

pub use http::HttpReferenceSource;

/// Remote APIs queried by the extraction run; both return the day's payload
/// as untouched JSON
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn fetch_trips(&self, date: NaiveDate) -> Result<Value>;
    async fn fetch_weather(&self, date: NaiveDate) -> Result<Value>;
}
