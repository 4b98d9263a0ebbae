//! SVG rainfall charts rendered with plotters.
//!
//! Three chart shapes are produced: the 24 hour station chart shown
//! by the interactive browser (hourly bars per date plus the running
//! accumulation on a secondary axis), the small chart embedded in map
//! marker popups, and a quick look of the clipped Voronoi partition.

use cemaden::hourly::HourlyTable;
use easy_cast::Cast;
use geo::{BoundingRect, LineString, MultiPolygon, Polygon};
use plotters::prelude::*;
use thiserror::Error;

/// Error type for chart rendering
#[derive(Error, Debug)]
pub enum ChartError {
    /// Backend failed while drawing
    #[error("Failed to render chart: {0}")]
    Render(String),

    /// Input series are empty or inconsistent
    #[error("Nothing to draw: {0}")]
    EmptyChart(String),
}

/// Type alias for Results using ChartError
pub type Result<T> = std::result::Result<T, ChartError>;

/// Bar colors for the per-date series, light to dark
const DATE_COLORS: [RGBColor; 4] = [
    RGBColor(166, 189, 219),
    RGBColor(54, 144, 192),
    RGBColor(2, 129, 138),
    RGBColor(1, 70, 54),
];

/// Line color for the running accumulation
const ACCUMULATED_COLOR: RGBColor = RGBColor(204, 76, 2);

/// Bar color for windowed hourly values in popup charts
const HOURLY_COLOR: RGBColor = RGBColor(65, 182, 196);

/// Bar color for the accumulation reached before each hour
const PRIOR_COLOR: RGBColor = RGBColor(254, 196, 79);

const STATION_CHART_SIZE: (u32, u32) = (1200, 600);
const POPUP_CHART_SIZE: (u32, u32) = (520, 240);
const PREVIEW_SIZE: (u32, u32) = (800, 800);

/// Renders the 24 hour chart for one station.
///
/// One bar group per hour label with one bar per date column, and the
/// running accumulation as a line against the secondary axis.
pub fn station_chart_svg(table: &HourlyTable, station_name: &str) -> Result<String> {
    if table.hours.is_empty() || table.dates.is_empty() {
        return Err(ChartError::EmptyChart(format!(
            "no hourly data for {}",
            station_name
        )));
    }
    let mut svg = String::new();
    draw_station_chart(&mut svg, table, station_name)
        .map_err(|e| ChartError::Render(e.to_string()))?;
    Ok(svg)
}

fn draw_station_chart<'a>(
    svg: &'a mut String,
    table: &HourlyTable,
    station_name: &str,
) -> DrawResult<(), SVGBackend<'a>> {
    let root = SVGBackend::with_string(svg, STATION_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_end: f64 = table.hours.len().cast();
    let y_max = axis_headroom(
        table
            .rows
            .iter()
            .flat_map(|row| row.iter().copied().flatten())
            .fold(0.0f64, f64::max),
    );
    let acc_max = axis_headroom(table.accumulated.last().copied().unwrap_or(0.0));

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} - last 24 hours (mm)", station_name),
            ("sans-serif", 28),
        )
        .margin(20i32)
        .x_label_area_size(40u32)
        .y_label_area_size(50u32)
        .right_y_label_area_size(50u32)
        .build_cartesian_2d(0f64..x_end, 0f64..y_max)?
        .set_secondary_coord(0f64..x_end, 0f64..acc_max);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(table.hours.len().min(24))
        .x_label_formatter(&|x| hour_label(&table.hours, *x))
        .y_desc("Hourly rain (mm)")
        .draw()?;
    chart
        .configure_secondary_axes()
        .y_desc("Accumulated (mm)")
        .draw()?;

    let bar_width = 0.84 / table.dates.len() as f64;
    for (date_index, date) in table.dates.iter().enumerate() {
        let color = DATE_COLORS[date_index % DATE_COLORS.len()];
        chart
            .draw_series(table.rows.iter().enumerate().filter_map(|(hour, row)| {
                row[date_index].map(|value| {
                    let x0 = hour as f64 + 0.08 + bar_width * date_index as f64;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, value)], color.filled())
                })
            }))?
            .label(date.as_str())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    chart
        .draw_secondary_series(LineSeries::new(
            table
                .accumulated
                .iter()
                .enumerate()
                .map(|(hour, acc)| (hour as f64 + 0.5, *acc)),
            ACCUMULATED_COLOR.stroke_width(3),
        ))?
        .label("Accumulated")
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], ACCUMULATED_COLOR.stroke_width(3))
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Renders the small chart embedded in a map marker popup.
///
/// `labels` are chronological hour labels, `hourly` the rain measured
/// in each hour and `prior` the accumulation reached before it.
pub fn popup_chart_svg(
    labels: &[String],
    hourly: &[Option<f64>],
    prior: &[f64],
    title: &str,
) -> Result<String> {
    if labels.is_empty() {
        return Err(ChartError::EmptyChart(format!("no popup data for {}", title)));
    }
    if labels.len() != hourly.len() || labels.len() != prior.len() {
        return Err(ChartError::EmptyChart(format!(
            "mismatched popup series for {}",
            title
        )));
    }
    let mut svg = String::new();
    draw_popup_chart(&mut svg, labels, hourly, prior, title)
        .map_err(|e| ChartError::Render(e.to_string()))?;
    Ok(svg)
}

fn draw_popup_chart<'a>(
    svg: &'a mut String,
    labels: &[String],
    hourly: &[Option<f64>],
    prior: &[f64],
    title: &str,
) -> DrawResult<(), SVGBackend<'a>> {
    let root = SVGBackend::with_string(svg, POPUP_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_end: f64 = labels.len().cast();
    let y_max = axis_headroom(
        hourly
            .iter()
            .copied()
            .flatten()
            .chain(prior.iter().copied())
            .fold(0.0f64, f64::max),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 16))
        .margin(8i32)
        .x_label_area_size(24u32)
        .y_label_area_size(32u32)
        .build_cartesian_2d(0f64..x_end, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().min(12))
        .x_label_formatter(&|x| hour_label(labels, *x))
        .draw()?;

    chart
        .draw_series(prior.iter().enumerate().map(|(i, value)| {
            let x0 = i as f64 + 0.1;
            Rectangle::new([(x0, 0.0), (x0 + 0.4, *value)], PRIOR_COLOR.filled())
        }))?
        .label("Accumulated before")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PRIOR_COLOR.filled()));

    chart
        .draw_series(hourly.iter().enumerate().filter_map(|(i, value)| {
            value.map(|v| {
                let x0 = i as f64 + 0.5;
                Rectangle::new([(x0, 0.0), (x0 + 0.4, v)], HOURLY_COLOR.filled())
            })
        }))?
        .label("Hourly rain")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], HOURLY_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Renders a quick look of the clipped partition over the boundary.
pub fn partition_preview_svg(
    regions: &[MultiPolygon<f64>],
    boundary: &Polygon<f64>,
) -> Result<String> {
    if boundary.exterior().coords().count() == 0 {
        return Err(ChartError::EmptyChart("empty boundary".to_string()));
    }
    let mut svg = String::new();
    draw_partition_preview(&mut svg, regions, boundary)
        .map_err(|e| ChartError::Render(e.to_string()))?;
    Ok(svg)
}

fn draw_partition_preview<'a>(
    svg: &'a mut String,
    regions: &[MultiPolygon<f64>],
    boundary: &Polygon<f64>,
) -> DrawResult<(), SVGBackend<'a>> {
    let root = SVGBackend::with_string(svg, PREVIEW_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let bounds = match boundary.bounding_rect() {
        Some(rect) => rect,
        None => return Ok(()),
    };
    let pad_x = (bounds.width() * 0.05).max(0.01);
    let pad_y = (bounds.height() * 0.05).max(0.01);

    let mut chart = ChartBuilder::on(&root)
        .margin(10i32)
        .x_label_area_size(30u32)
        .y_label_area_size(40u32)
        .build_cartesian_2d(
            bounds.min().x - pad_x..bounds.max().x + pad_x,
            bounds.min().y - pad_y..bounds.max().y + pad_y,
        )?;
    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        ring_points(boundary.exterior()),
        BLACK.stroke_width(2),
    )))?;

    for region in regions {
        chart.draw_series(
            region
                .0
                .iter()
                .map(|polygon| PathElement::new(ring_points(polygon.exterior()), RED)),
        )?;
    }
    root.present()?;
    Ok(())
}

fn ring_points(ring: &LineString<f64>) -> Vec<(f64, f64)> {
    ring.coords().map(|c| (c.x, c.y)).collect()
}

fn hour_label(labels: &[String], x: f64) -> String {
    let index = x.floor();
    if index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn axis_headroom(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max * 1.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cemaden::hourly::HourlyTable;

    #[test]
    fn test_hour_label_floors_to_the_slot() {
        let labels = vec!["10:00".to_string(), "11:00".to_string()];
        assert_eq!(hour_label(&labels, 0.0), "10:00");
        assert_eq!(hour_label(&labels, 0.7), "10:00");
        assert_eq!(hour_label(&labels, 1.2), "11:00");
        assert_eq!(hour_label(&labels, 2.0), "");
        assert_eq!(hour_label(&labels, -0.5), "");
    }

    #[test]
    fn test_axis_headroom() {
        assert!((axis_headroom(0.0) - 1.0).abs() < 1e-9);
        assert!((axis_headroom(10.0) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let table = HourlyTable {
            hours: vec![],
            dates: vec![],
            rows: vec![],
            accumulated: vec![],
        };
        assert!(station_chart_svg(&table, "Bessa").is_err());
    }

    #[test]
    fn test_mismatched_popup_series_are_rejected() {
        let labels = vec!["10:00".to_string()];
        let hourly = vec![Some(1.0), Some(2.0)];
        let prior = vec![0.0];
        assert!(popup_chart_svg(&labels, &hourly, &prior, "Bessa").is_err());
    }

    #[test]
    fn test_empty_boundary_is_rejected() {
        let boundary = Polygon::new(LineString::from(Vec::<(f64, f64)>::new()), vec![]);
        assert!(partition_preview_svg(&[], &boundary).is_err());
    }
}
