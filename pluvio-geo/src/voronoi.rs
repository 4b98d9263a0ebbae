use crate::error::{GeoError, Result};
use geo::{BooleanOps, LineString, MultiPolygon, Polygon};
use voronoice::{BoundingBox, Point, VoronoiBuilder};

/// Radius in degrees of the influence disk drawn around every gauge
pub const DISK_RADIUS_DEG: f64 = 0.04;

/// Default half-extent in degrees of the square Voronoi frame
pub const DEFAULT_FRAME_RADIUS_DEG: f64 = 1.0;

/// Segments in the polygonal approximation of the influence disk
const DISK_SEGMENTS: usize = 64;

/// Minimum number of sites for a meaningful partition
const MIN_SITES: usize = 3;

/// Planar partition site. `x` is longitude and `y` latitude.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Site {
    pub x: f64,
    pub y: f64,
}

impl Site {
    pub fn new(x: f64, y: f64) -> Self {
        Site { x, y }
    }
}

/// Computes the Voronoi cell of every site inside a square frame.
///
/// Cells come back in site order, clipped to the frame. Geographic
/// coordinates are treated as plane coordinates; at municipal scale
/// the distortion does not matter.
pub fn voronoi_cells(
    sites: &[Site],
    center: Site,
    frame_radius: f64,
) -> Result<Vec<Polygon<f64>>> {
    if sites.len() < MIN_SITES {
        return Err(GeoError::DegenerateSites {
            needed: MIN_SITES,
            found: sites.len(),
        });
    }
    for site in sites {
        if (site.x - center.x).abs() > frame_radius || (site.y - center.y).abs() > frame_radius {
            log::warn!(
                "site ({}, {}) lies outside the Voronoi frame",
                site.x,
                site.y
            );
        }
    }

    let points: Vec<Point> = sites.iter().map(|s| Point { x: s.x, y: s.y }).collect();
    let diagram = VoronoiBuilder::default()
        .set_sites(points)
        .set_bounding_box(BoundingBox::new(
            Point {
                x: center.x,
                y: center.y,
            },
            2.0 * frame_radius,
            2.0 * frame_radius,
        ))
        .build()
        .ok_or(GeoError::DegenerateSites {
            needed: MIN_SITES,
            found: sites.len(),
        })?;

    let cells: Vec<Polygon<f64>> = diagram
        .iter_cells()
        .map(|cell| {
            let ring: Vec<(f64, f64)> = cell.iter_vertices().map(|v| (v.x, v.y)).collect();
            Polygon::new(LineString::from(ring), vec![])
        })
        .collect();

    if cells.len() != sites.len() {
        return Err(GeoError::CellCountMismatch {
            cells: cells.len(),
            sites: sites.len(),
        });
    }
    Ok(cells)
}

/// Regular polygon approximating the influence disk of one gauge.
pub fn disk(center: Site, radius: f64) -> Polygon<f64> {
    let ring: Vec<(f64, f64)> = (0..DISK_SEGMENTS)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / DISK_SEGMENTS as f64;
            (
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}

/// Clips one Voronoi cell to its influence disk and the boundary.
///
/// The result can be empty when the gauge lies outside the boundary.
pub fn clip_cell(cell: &Polygon<f64>, site: Site, boundary: &Polygon<f64>) -> MultiPolygon<f64> {
    let region = MultiPolygon::new(vec![cell.clone()]);
    let influence = MultiPolygon::new(vec![disk(site, DISK_RADIUS_DEG)]);
    let bounded = region.intersection(&influence);
    bounded.intersection(&MultiPolygon::new(vec![boundary.clone()]))
}

/// Full partition: the Voronoi cell of every site, capped by its
/// influence disk and clipped to the boundary, in site order.
pub fn clipped_partition(
    sites: &[Site],
    center: Site,
    frame_radius: f64,
    boundary: &Polygon<f64>,
) -> Result<Vec<MultiPolygon<f64>>> {
    let cells = voronoi_cells(sites, center, frame_radius)?;
    Ok(cells
        .iter()
        .zip(sites)
        .map(|(cell, site)| clip_cell(cell, *site, boundary))
        .collect())
}
