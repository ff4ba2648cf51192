/// File type identifiers used in object names
pub const TAXI_FILE_TYPE: &str = "taxi";
pub const WEATHER_FILE_TYPE: &str = "weather";

/// Default bucket and prefixes
pub const DEFAULT_BUCKET: &str = "cubix-chicago-taxi-a8i9zm";
pub const DEFAULT_REGION: &str = "eu-central-1";
pub const RAW_TAXI_INCOMING_PREFIX: &str = "raw_data/to_processed/taxi_data/";
pub const RAW_WEATHER_INCOMING_PREFIX: &str = "raw_data/to_processed/weather_data/";
pub const RAW_TAXI_PROCESSED_PREFIX: &str = "raw_data/processed/taxi_data/";
pub const RAW_WEATHER_PROCESSED_PREFIX: &str = "raw_data/processed/weather_data/";
pub const TRANSFORMED_TAXI_PREFIX: &str = "transformed_data/taxi_trips/";
pub const TRANSFORMED_WEATHER_PREFIX: &str = "transformed_data/weather/";
pub const PAYMENT_TYPE_MASTER_PREFIX: &str = "transformed_data/payment_type/";
pub const COMPANY_MASTER_PREFIX: &str = "transformed_data/company/";
pub const MASTER_PREVIOUS_VERSION_PREFIX: &str = "transformed_data/master_table_previous_version/";

/// Trip source (Chicago data portal)
pub const TAXI_API_URL: &str = "https://data.cityofchicago.org/resource/ajtu-isnz.json";
pub const TAXI_API_TOKEN_ENV: &str = "CHICAGO_API_TOKEN";
pub const TAXI_API_TOKEN_HEADER: &str = "X-App-Token";
pub const TAXI_API_LIMIT: u32 = 30_000;

/// Weather source (Open-Meteo ERA5 archive), fixed on Chicago
pub const WEATHER_API_URL: &str = "https://archive-api.open-meteo.com/v1/era5";
pub const WEATHER_LATITUDE: f64 = 41.85;
pub const WEATHER_LONGITUDE: f64 = -87.65;
pub const WEATHER_HOURLY_FIELDS: &str = "temperature_2m,wind_speed_10m,precipitation,rain";

/// Publication lag of the trip data provider
pub const DEFAULT_LAG_MONTHS: u32 = 2;

/// Timestamp formats
pub const TRIP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub const WEATHER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FILE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Content types for uploaded objects
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_CSV: &str = "text/csv";

/// Config file and environment overrides
pub const DEFAULT_CONFIG_FILE: &str = "taxi-etl.toml";
pub const ENV_PREFIX: &str = "TAXI_ETL";
