//! Layered settings: built-in defaults, then an optional TOML file, then
//! `TAXI_ETL__SECTION__KEY` environment variables.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{EtlError, Result};
use crate::storage::{S3Config, StorageLayout};
use crate::utils::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub s3: S3Config,
    /// Root directory of the `local` backend
    pub local_root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            s3: S3Config::default(),
            local_root: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TripSourceSettings {
    #[validate(url)]
    pub url: String,
    #[validate(range(min = 1))]
    pub limit: u32,
    /// Environment variable holding the app token
    pub token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WeatherSourceSettings {
    #[validate(url)]
    pub url: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1))]
    pub hourly_fields: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceSettings {
    #[validate(nested)]
    pub trips: TripSourceSettings,
    #[validate(nested)]
    pub weather: WeatherSourceSettings,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            trips: TripSourceSettings {
                url: TAXI_API_URL.to_string(),
                limit: TAXI_API_LIMIT,
                token_env: TAXI_API_TOKEN_ENV.to_string(),
            },
            weather: WeatherSourceSettings {
                url: WEATHER_API_URL.to_string(),
                latitude: WEATHER_LATITUDE,
                longitude: WEATHER_LONGITUDE,
                hourly_fields: WEATHER_HOURLY_FIELDS.to_string(),
            },
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractSettings {
    #[validate(range(max = 24))]
    pub lag_months: u32,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            lag_months: DEFAULT_LAG_MONTHS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub storage: StorageSettings,
    #[validate(nested)]
    pub layout: StorageLayout,
    #[validate(nested)]
    pub sources: SourceSettings,
    #[validate(nested)]
    pub extract: ExtractSettings,
}

impl Settings {
    /// Load settings. An explicit `path` must exist; otherwise `taxi-etl.toml`
    /// in the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Settings::default())?;

        let mut builder = Config::builder().add_source(defaults);
        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    /// Field validation plus cross-field checks
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if self.storage.backend == StorageBackend::S3 && self.storage.s3.bucket.trim().is_empty() {
            return Err(EtlError::Config("storage.s3.bucket cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Trip API token from the configured environment variable
    pub fn trip_api_token(&self) -> Option<String> {
        std::env::var(&self.sources.trips.token_env)
            .ok()
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.check().is_ok());
        assert_eq!(settings.storage.s3.bucket, DEFAULT_BUCKET);
        assert_eq!(settings.extract.lag_months, 2);
        assert_eq!(settings.sources.trips.limit, 30_000);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[storage]
backend = "local"
local_root = "/tmp/taxi-etl"

[extract]
lag_months = 3

[sources.weather]
latitude = 40.0
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.storage.backend, StorageBackend::Local);
        assert_eq!(settings.storage.local_root, PathBuf::from("/tmp/taxi-etl"));
        assert_eq!(settings.extract.lag_months, 3);
        assert_eq!(settings.sources.weather.latitude, 40.0);
        // Untouched values keep their defaults
        assert_eq!(settings.sources.weather.longitude, WEATHER_LONGITUDE);
        assert_eq!(settings.layout, StorageLayout::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut settings = Settings::default();
        settings.sources.weather.latitude = 123.0;
        assert!(matches!(settings.check(), Err(EtlError::Validation(_))));

        let mut settings = Settings::default();
        settings.storage.s3.bucket = " ".to_string();
        assert!(matches!(settings.check(), Err(EtlError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/taxi-etl.toml")));
        assert!(matches!(result, Err(EtlError::Config(_))));
    }
}
