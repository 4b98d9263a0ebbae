use crate::error::{GeoError, Result};
use geo::{LineString, Polygon};
use geojson::{GeoJson, Geometry, Value};
use std::path::Path;

/// Loads a municipal boundary from a GeoJSON file.
///
/// The IBGE municipal mesh ships one GeometryCollection per
/// municipality; other producers use Feature or FeatureCollection
/// documents. The first polygonal geometry found wins, and only its
/// outer ring is kept.
pub fn load_boundary<P: AsRef<Path>>(path: P) -> Result<Polygon<f64>> {
    let raw = std::fs::read_to_string(&path)?;
    parse_boundary(&raw).map_err(|e| match e {
        GeoError::NoPolygon(_) => GeoError::NoPolygon(path.as_ref().display().to_string()),
        other => other,
    })
}

/// Parses a boundary polygon from GeoJSON text.
pub fn parse_boundary(raw: &str) -> Result<Polygon<f64>> {
    let document = raw.parse::<GeoJson>()?;
    first_polygon(&document).ok_or_else(|| GeoError::NoPolygon("GeoJSON document".to_string()))
}

fn first_polygon(document: &GeoJson) -> Option<Polygon<f64>> {
    match document {
        GeoJson::Geometry(geometry) => polygon_from_geometry(geometry),
        GeoJson::Feature(feature) => feature.geometry.as_ref().and_then(polygon_from_geometry),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .find_map(polygon_from_geometry),
    }
}

fn polygon_from_geometry(geometry: &Geometry) -> Option<Polygon<f64>> {
    match &geometry.value {
        Value::Polygon(rings) => polygon_from_rings(rings),
        Value::MultiPolygon(polygons) => {
            polygons.first().and_then(|rings| polygon_from_rings(rings))
        }
        Value::GeometryCollection(members) => members.iter().find_map(polygon_from_geometry),
        _ => None,
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let exterior = rings.first()?;
    // A closed ring needs at least four positions
    if exterior.len() < 4 {
        return None;
    }
    let coords: Vec<(f64, f64)> = exterior
        .iter()
        .filter_map(|position| Some((*position.first()?, *position.get(1)?)))
        .collect();
    if coords.len() < 4 {
        return None;
    }
    Some(Polygon::new(LineString::from(coords), vec![]))
}
