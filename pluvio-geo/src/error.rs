/// Error types for the geometry pipeline
use thiserror::Error;

/// Main error type for partition and boundary operations
#[derive(Error, Debug)]
pub enum GeoError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// GeoJSON text failed to parse
    #[error("Failed to parse GeoJSON: {0}")]
    GeoJsonParse(#[from] geojson::Error),

    /// Document carries no usable polygonal geometry
    #[error("No polygon found in {0}")]
    NoPolygon(String),

    /// Too few sites for a Voronoi partition
    #[error("Voronoi partition needs at least {needed} sites, found {found}")]
    DegenerateSites { needed: usize, found: usize },

    /// Partition did not produce one cell per site
    #[error("Voronoi partition produced {cells} cells for {sites} sites")]
    CellCountMismatch { cells: usize, sites: usize },
}

/// Type alias for Results using GeoError
pub type Result<T> = std::result::Result<T, GeoError>;
