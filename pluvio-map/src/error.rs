/// Error types for the map writer
use thiserror::Error;

/// Main error type for map building
#[derive(Error, Debug)]
pub enum MapError {
    /// File could not be created or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Color scale bins are unusable
    #[error("Invalid color scale: {0}")]
    InvalidScale(String),

    /// Station names and regions do not pair up
    #[error("Feature mismatch: {names} names for {regions} regions")]
    FeatureMismatch { names: usize, regions: usize },
}

/// Type alias for Results using MapError
pub type Result<T> = std::result::Result<T, MapError>;
