//! Leaflet choropleth map for windowed rainfall.
//!
//! Turns the clipped gauge regions and their 24 hour totals into a
//! self-contained HTML page: a choropleth layer over OpenStreetMap
//! tiles, one marker per reporting gauge and a legend for the color
//! scale.

pub mod error;
pub mod leaflet;
pub mod scale;
