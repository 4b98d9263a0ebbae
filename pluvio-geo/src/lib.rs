//! Geometric partition of a gauge network.
//!
//! Builds the Voronoi diagram of the gauges, intersects every cell
//! with a fixed-radius influence disk and clips the result to a
//! municipal boundary loaded from GeoJSON.

pub mod boundary;
pub mod error;
pub mod voronoi;
