//! Offline rainfall map built from a CEMADEN readings export.
//!
//! Loads the CSV, partitions the plane around the gauges, clips every
//! region to its influence disk and the municipal boundary, aggregates
//! the trailing 24 hours at a prompted reference time and writes an
//! interactive Leaflet page.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::Context;
use cemaden::aggregate::{self, WINDOW_SLOTS};
use cemaden::reading::read_readings_csv;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use pluvio_geo::boundary::load_boundary;
use pluvio_geo::voronoi::{clipped_partition, Site};
use pluvio_map::leaflet::{choropleth_features, MapFile, MapWriter, DEFAULT_ZOOM};
use pluvio_map::scale::{ColorScale, ALERT_BINS, RISK_THRESHOLD_MM};

use crate::menu;

/// Everything the map command needs, filled in from the CLI.
pub struct MapArgs {
    pub readings_csv: String,
    pub boundary: String,
    pub output: String,
    pub year: i32,
    pub month: u32,
    pub frame_radius: f64,
    pub partition_svg: Option<String>,
    pub no_open: bool,
}

/// Day proposed when the user just presses enter
const DEFAULT_DAY: u32 = 14;

pub fn run_map(args: &MapArgs) -> anyhow::Result<()> {
    let readings = read_readings_csv(&args.readings_csv)
        .with_context(|| format!("reading {}", args.readings_csv))?;
    if readings.is_empty() {
        anyhow::bail!("{} holds no readings", args.readings_csv);
    }
    log::info!("{} readings loaded from {}", readings.len(), args.readings_csv);

    let coordinates = aggregate::station_coordinates(&readings);
    let names: Vec<String> = coordinates.keys().cloned().collect();
    let sites: Vec<Site> = coordinates
        .values()
        .map(|(lat, lon)| Site::new(*lon, *lat))
        .collect();
    let (center_lat, center_lon) = aggregate::centroid(&coordinates)
        .ok_or_else(|| anyhow::anyhow!("no station coordinates in the readings"))?;

    let boundary = load_boundary(&args.boundary)?;
    let regions = clipped_partition(
        &sites,
        Site::new(center_lon, center_lat),
        args.frame_radius,
        &boundary,
    )?;

    if let Some(pth) = &args.partition_svg {
        let svg = pluvio_chart::partition_preview_svg(&regions, &boundary)?;
        std::fs::write(pth, svg).with_context(|| format!("writing {pth}"))?;
        log::info!("partition preview written to {pth}");
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let reference = prompt_reference(&mut input, &mut output, args.year, args.month)?;
    writeln!(output, "Simulating {reference}.")?;

    let totals = aggregate::totals_by_station(&readings, reference);
    let matrix = aggregate::hourly_by_station(&readings, reference);
    let scale = choose_scale(&mut input, &mut output, &totals)?;

    let features = choropleth_features(&names, &regions, &totals, &scale)?;
    let title = format!("Rain over the last 24 h at {reference}");
    {
        let mut map = MapFile::create(
            &args.output,
            &title,
            (center_lat, center_lon),
            DEFAULT_ZOOM,
        )?;
        map.add_choropleth(&features)?;

        for (station, slots) in &matrix {
            let (lat, lon) = match coordinates.get(station) {
                Some(position) => *position,
                None => continue,
            };
            let total = totals.get(station).copied().unwrap_or(0.0);
            let (labels, hourly, prior) = popup_series(slots, reference);
            let popup = pluvio_chart::popup_chart_svg(&labels, &hourly, &prior, station)?;
            let tooltip = format!("{station}: {total:.1} mm");
            map.add_marker(lat, lon, total > RISK_THRESHOLD_MM, &tooltip, &popup)?;
        }
        map.add_legend("Accumulated rainfall (mm)", &scale.legend())?;
    }
    log::info!("map written to {}", args.output);
    if !args.no_open {
        crate::monitor::open_in_browser(Path::new(&args.output));
    }
    Ok(())
}

/// Asks for the day and the hour of the simulated reference time.
fn prompt_reference<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    year: i32,
    month: u32,
) -> anyhow::Result<NaiveDateTime> {
    let days = days_in_month(year, month)
        .ok_or_else(|| anyhow::anyhow!("{year}-{month:02} is not a calendar month"))?;
    let default_day = DEFAULT_DAY.min(days);
    let day = menu::prompt_in_range(
        input,
        output,
        &format!("Day of {year:04}-{month:02} (default {default_day}): "),
        1,
        days,
        default_day,
    )?;
    let hour = menu::prompt_in_range(
        input,
        output,
        "Hour of the day, 0 to 23 (default 0): ",
        0,
        23,
        0,
    )?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::anyhow!("{year}-{month:02}-{day:02} is not a calendar date"))?;
    let reference = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("{hour} is not an hour of the day"))?;
    Ok(reference)
}

/// Picks the color scale, offering a relative one when the fixed alert
/// bins would paint every region with the darkest color.
fn choose_scale<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    totals: &BTreeMap<String, f64>,
) -> anyhow::Result<ColorScale> {
    let values: Vec<f64> = totals.values().copied().collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let top_bin = ALERT_BINS[ALERT_BINS.len() - 1];

    if !values.is_empty() && min > RISK_THRESHOLD_MM && max > top_bin {
        writeln!(
            output,
            "Every station is above the {RISK_THRESHOLD_MM} mm risk threshold."
        )?;
        writeln!(
            output,
            "A relative scale spreads the colors over the observed range."
        )?;
        let answer = menu::prompt_from_set(
            input,
            output,
            "Use a relative scale? 1 for yes, 0 for no (default 0): ",
            &[0, 1],
            0,
        )?;
        if answer == 1 {
            return Ok(ColorScale::relative(&values)?);
        }
    }
    Ok(ColorScale::fixed(max))
}

/// Expands one station's hour slots into the three popup chart series,
/// oldest hour first: end-of-hour labels, rain per hour and the
/// accumulation before each hour.
fn popup_series(
    slots: &[Option<f64>; WINDOW_SLOTS],
    reference: NaiveDateTime,
) -> (Vec<String>, Vec<Option<f64>>, Vec<f64>) {
    let mut labels = Vec::with_capacity(WINDOW_SLOTS);
    let mut hourly = Vec::with_capacity(WINDOW_SLOTS);
    let mut prior = Vec::with_capacity(WINDOW_SLOTS);
    let mut running = 0.0;
    for offset in (0..WINDOW_SLOTS).rev() {
        let value = slots[offset];
        labels.push(
            (reference - Duration::hours(offset as i64))
                .format("%H:%M")
                .to_string(),
        );
        hourly.push(value);
        prior.push(running);
        running += value.unwrap_or(0.0);
    }
    (labels, hourly, prior)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 6, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn popup_series_runs_oldest_hour_first() {
        let mut slots = [None; WINDOW_SLOTS];
        slots[0] = Some(2.5);
        slots[23] = Some(1.0);
        let (labels, hourly, prior) = popup_series(&slots, reference());

        assert_eq!(labels.len(), WINDOW_SLOTS);
        assert_eq!(labels[0], "11:00");
        assert_eq!(labels[23], "10:00");
        assert_eq!(hourly[0], Some(1.0));
        assert_eq!(hourly[23], Some(2.5));
        assert_eq!(prior[0], 0.0);
        assert_eq!(prior[23], 1.0);
    }

    #[test]
    fn prior_accumulation_never_decreases() {
        let mut slots = [None; WINDOW_SLOTS];
        slots[3] = Some(0.4);
        slots[10] = Some(1.2);
        slots[17] = Some(0.8);
        let (_, _, prior) = popup_series(&slots, reference());
        for pair in prior.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(prior[23], 2.4);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2019, 6), Some(30));
        assert_eq!(days_in_month(2019, 2), Some(28));
        assert_eq!(days_in_month(2020, 2), Some(29));
        assert_eq!(days_in_month(2019, 12), Some(31));
        assert_eq!(days_in_month(2019, 13), None);
    }

    #[test]
    fn reference_prompt_defaults_to_day_14_midnight() {
        let mut input = Cursor::new("\n\n");
        let mut output = Vec::new();
        let reference = prompt_reference(&mut input, &mut output, 2019, 6).unwrap();
        assert_eq!(reference.to_string(), "2019-06-14 00:00:00");
    }

    #[test]
    fn reference_prompt_accepts_an_explicit_day_and_hour() {
        let mut input = Cursor::new("20\n18\n");
        let mut output = Vec::new();
        let reference = prompt_reference(&mut input, &mut output, 2019, 6).unwrap();
        assert_eq!(reference.to_string(), "2019-06-20 18:00:00");
    }

    #[test]
    fn scale_prompt_only_appears_when_the_fixed_bins_saturate() {
        let mut low = BTreeMap::new();
        low.insert("Bessa".to_string(), 3.5);
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let scale = choose_scale(&mut input, &mut output, &low).unwrap();
        assert!(output.is_empty());
        assert_eq!(scale.bins(), ALERT_BINS.as_slice());
    }

    #[test]
    fn saturated_totals_can_switch_to_a_relative_scale() {
        let mut heavy = BTreeMap::new();
        heavy.insert("Bessa".to_string(), 60.0);
        heavy.insert("Centro".to_string(), 70.0);
        heavy.insert("Mangabeira".to_string(), 80.0);

        let mut input = Cursor::new("1\n");
        let mut output = Vec::new();
        let scale = choose_scale(&mut input, &mut output, &heavy).unwrap();
        assert_eq!(scale.bins().first(), Some(&60.0));
        assert_eq!(scale.bins().last(), Some(&80.0));

        let mut input = Cursor::new("0\n");
        let mut output = Vec::new();
        let scale = choose_scale(&mut input, &mut output, &heavy).unwrap();
        assert_eq!(scale.bins().last(), Some(&80.0));
        assert!(scale.covers(0.0));
    }
}
