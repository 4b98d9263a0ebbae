/// Error types for the CEMADEN library
use thiserror::Error;

/// Main error type for CEMADEN operations
#[derive(Error, Debug)]
pub enum CemadenError {
    /// HTTP request failed
    #[cfg(feature = "api")]
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Failed to parse HTTP response
    #[error("Failed to parse HTTP response: {0}")]
    ResponseParse(String),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Date parsing failed
    #[error("Failed to parse date: {0}")]
    DateParse(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Hourly series matrix is ragged
    #[error("Ragged hourly series (expected {expected} values per date, found {found})")]
    RaggedSeries { expected: usize, found: usize },

    /// Station not found
    #[error("Station not found: {0}")]
    StationNotFound(u32),
}

/// Type alias for Results using CemadenError
pub type Result<T> = std::result::Result<T, CemadenError>;
