use thiserror::Error;

use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Column '{column}' not found in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Unexpected shape for {table}: expected {expected}, found {found}")]
    WrongShape {
        table: String,
        expected: String,
        found: String,
    },

    #[error("Weather field '{field}' has {actual} values, expected {expected}")]
    WeatherShape {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Corrupt master table: {0}")]
    CorruptMaster(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl From<config::ConfigError> for EtlError {
    fn from(err: config::ConfigError) -> Self {
        EtlError::Config(err.to_string())
    }
}

impl EtlError {
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        EtlError::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// True for the input-validation kinds that are raised before any I/O happens
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EtlError::MissingColumn { .. }
                | EtlError::WrongShape { .. }
                | EtlError::WeatherShape { .. }
                | EtlError::CorruptMaster(_)
                | EtlError::Validation(_)
        )
    }
}
