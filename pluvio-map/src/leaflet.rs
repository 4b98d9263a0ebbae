//! Streaming Leaflet HTML writer.
//!
//! Writes a self-contained HTML page that pulls Leaflet from its CDN
//! and builds the map with inline JavaScript. The caller opens the
//! document, adds layers in order and lets the file close itself on
//! drop. Everything user-visible goes through JSON encoding so quotes
//! in station names cannot break the script.

use crate::error::{MapError, Result};
use crate::scale::{ColorScale, MISSING_COLOR};
use geo::MultiPolygon;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Leaflet version pinned for the CDN links
const LEAFLET_VERSION: &str = "1.9.4";

/// Default zoom for municipal maps
pub const DEFAULT_ZOOM: u32 = 12;

/// HTML map document on disk. The footer is written when the value
/// drops.
pub struct MapFile(BufWriter<File>);

impl MapFile {
    /// Creates the HTML file and writes the document header.
    pub fn create<P: AsRef<Path>>(
        pth: P,
        title: &str,
        center: (f64, f64),
        zoom: u32,
    ) -> Result<Self> {
        let f = File::create(pth.as_ref())?;
        let mut new = MapFile(BufWriter::new(f));
        new.start_document(title, center, zoom)?;
        Ok(new)
    }
}

impl MapWriter for MapFile {
    fn output(&mut self) -> &mut dyn Write {
        &mut self.0
    }
}

impl Drop for MapFile {
    fn drop(&mut self) {
        self.finish_document();
    }
}

pub trait MapWriter {
    fn output(&mut self) -> &mut dyn Write;

    /// Writes the page header, the map container and the tile layer.
    fn start_document(&mut self, title: &str, center: (f64, f64), zoom: u32) -> Result<()> {
        let out = self.output();
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>")?;
        writeln!(out, "<head>")?;
        writeln!(out, "<meta charset=\"utf-8\"/>")?;
        writeln!(out, "<title>{}</title>", title)?;
        writeln!(
            out,
            "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@{}/dist/leaflet.css\"/>",
            LEAFLET_VERSION
        )?;
        writeln!(
            out,
            "<script src=\"https://unpkg.com/leaflet@{}/dist/leaflet.js\"></script>",
            LEAFLET_VERSION
        )?;
        writeln!(
            out,
            "<style>html, body, #map {{ height: 100%; margin: 0; }}</style>"
        )?;
        writeln!(out, "</head>")?;
        writeln!(out, "<body>")?;
        writeln!(out, "<div id=\"map\"></div>")?;
        writeln!(out, "<script>")?;
        writeln!(
            out,
            "var map = L.map('map').setView([{}, {}], {});",
            center.0, center.1, zoom
        )?;
        writeln!(out, "L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{maxZoom: 19, attribution: '&copy; OpenStreetMap contributors'}}).addTo(map);")?;
        Ok(())
    }

    /// Closes the script and the page. Errors are ignored, the file
    /// is going away anyway.
    fn finish_document(&mut self) {
        let _ = writeln!(self.output(), "</script>");
        let _ = writeln!(self.output(), "</body>");
        let _ = writeln!(self.output(), "</html>");
    }

    /// Adds the choropleth layer from a GeoJSON FeatureCollection.
    ///
    /// Each feature is expected to carry its fill color in
    /// `properties.fill`, see [`choropleth_features`].
    fn add_choropleth(&mut self, features: &serde_json::Value) -> Result<()> {
        let out = self.output();
        writeln!(out, "var cells = {};", features)?;
        writeln!(out, "L.geoJSON(cells, {{")?;
        writeln!(out, "  style: function (feature) {{")?;
        writeln!(out, "    return {{color: '#444444', weight: 1, opacity: 0.25, fillColor: feature.properties.fill, fillOpacity: 0.75}};")?;
        writeln!(out, "  }}")?;
        writeln!(out, "}}).addTo(map);")?;
        Ok(())
    }

    /// Adds one gauge marker with a tooltip and an HTML popup.
    ///
    /// Risk gauges are drawn red, the rest green.
    fn add_marker(
        &mut self,
        lat: f64,
        lon: f64,
        risk: bool,
        tooltip: &str,
        popup_html: &str,
    ) -> Result<()> {
        let color = if risk { "red" } else { "green" };
        writeln!(
            self.output(),
            "L.circleMarker([{}, {}], {{radius: 7, color: '{}', fillColor: '{}', fillOpacity: 0.9}}).bindTooltip({}).bindPopup({}, {{maxWidth: 560}}).addTo(map);",
            lat,
            lon,
            color,
            color,
            json!(tooltip),
            json!(popup_html)
        )?;
        Ok(())
    }

    /// Adds the legend control in the bottom right corner.
    fn add_legend(&mut self, title: &str, entries: &[(String, &'static str)]) -> Result<()> {
        let mut html = format!("<strong>{}</strong><br/>", title);
        for (label, color) in entries {
            html.push_str(&format!(
                "<i style=\"background:{};display:inline-block;width:12px;height:12px;margin-right:4px\"></i>{}<br/>",
                color, label
            ));
        }
        let out = self.output();
        writeln!(out, "var legend = L.control({{position: 'bottomright'}});")?;
        writeln!(out, "legend.onAdd = function (map) {{")?;
        writeln!(out, "  var div = L.DomUtil.create('div');")?;
        writeln!(out, "  div.style.background = 'rgba(255,255,255,0.85)';")?;
        writeln!(out, "  div.style.padding = '6px 8px';")?;
        writeln!(out, "  div.innerHTML = {};", json!(html))?;
        writeln!(out, "  return div;")?;
        writeln!(out, "}};")?;
        writeln!(out, "legend.addTo(map);")?;
        Ok(())
    }
}

/// Builds the GeoJSON FeatureCollection for the choropleth.
///
/// One feature per station in input order, keyed by station name,
/// with the windowed total and the fill color precomputed in the
/// properties. Stations without a windowed total keep their region
/// and get the missing fill.
pub fn choropleth_features(
    names: &[String],
    regions: &[MultiPolygon<f64>],
    totals: &BTreeMap<String, f64>,
    scale: &ColorScale,
) -> Result<serde_json::Value> {
    if names.len() != regions.len() {
        return Err(MapError::FeatureMismatch {
            names: names.len(),
            regions: regions.len(),
        });
    }
    let features: Vec<serde_json::Value> = names
        .iter()
        .zip(regions)
        .map(|(name, region)| {
            let total = totals.get(name).copied();
            let fill = match total {
                Some(value) => scale.color_for(value),
                None => MISSING_COLOR,
            };
            json!({
                "type": "Feature",
                "id": name,
                "properties": {
                    "name": name,
                    "total_mm": total,
                    "fill": fill,
                },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": multipolygon_coordinates(region),
                },
            })
        })
        .collect();
    Ok(json!({"type": "FeatureCollection", "features": features}))
}

fn multipolygon_coordinates(region: &MultiPolygon<f64>) -> serde_json::Value {
    let polygons: Vec<serde_json::Value> = region
        .0
        .iter()
        .map(|polygon| {
            let mut rings = vec![ring_coordinates(polygon.exterior())];
            rings.extend(polygon.interiors().iter().map(ring_coordinates));
            serde_json::Value::Array(rings)
        })
        .collect();
    serde_json::Value::Array(polygons)
}

fn ring_coordinates(ring: &geo::LineString<f64>) -> serde_json::Value {
    serde_json::Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}
