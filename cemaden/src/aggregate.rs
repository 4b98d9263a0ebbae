//! Trailing-window aggregation of gauge readings.
//!
//! The map pipeline reduces a month of readings to the 24 hours that
//! precede a chosen reference instant. Readings are bucketed by whole
//! hours elapsed before the reference, so the window is half-open:
//! the reference instant itself is included, the instant exactly 24
//! hours earlier is not.

use crate::reading::Reading;
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Length of the trailing aggregation window, in hours
pub const WINDOW_HOURS: i64 = 24;

/// Number of hour slots in the window
pub const WINDOW_SLOTS: usize = WINDOW_HOURS as usize;

/// Whole hours elapsed between a reading and the reference instant.
///
/// Offset 0 is the hour ending at the reference. Readings stamped
/// after the reference produce negative offsets.
pub fn hour_offset(reference: NaiveDateTime, timestamp: NaiveDateTime) -> i64 {
    (reference - timestamp).num_seconds().div_euclid(3600)
}

/// True when a reading falls inside the trailing window.
pub fn in_window(reference: NaiveDateTime, timestamp: NaiveDateTime) -> bool {
    (0..WINDOW_HOURS).contains(&hour_offset(reference, timestamp))
}

/// Readings inside the trailing window, in input order.
pub fn filter_window<'a>(readings: &'a [Reading], reference: NaiveDateTime) -> Vec<&'a Reading> {
    readings
        .iter()
        .filter(|r| in_window(reference, r.timestamp))
        .collect()
}

/// Total windowed rainfall per station.
pub fn totals_by_station(
    readings: &[Reading],
    reference: NaiveDateTime,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for reading in filter_window(readings, reference) {
        *totals.entry(reading.station.clone()).or_insert(0.0) += reading.value_mm;
    }
    totals
}

/// Station-by-hour pivot of the trailing window.
///
/// Slot 0 holds the hour ending at the reference and slot 23 the
/// oldest hour of the window. Hours without a reading stay None;
/// several readings in the same hour sum into one slot.
pub fn hourly_by_station(
    readings: &[Reading],
    reference: NaiveDateTime,
) -> BTreeMap<String, [Option<f64>; WINDOW_SLOTS]> {
    let mut matrix: BTreeMap<String, [Option<f64>; WINDOW_SLOTS]> = BTreeMap::new();
    for reading in readings {
        let offset = hour_offset(reference, reading.timestamp);
        if !(0..WINDOW_HOURS).contains(&offset) {
            continue;
        }
        let slots = matrix
            .entry(reading.station.clone())
            .or_insert([None; WINDOW_SLOTS]);
        let slot = &mut slots[offset as usize];
        *slot = Some(slot.unwrap_or(0.0) + reading.value_mm);
    }
    matrix
}

/// Mean coordinates per station, rounded to three decimals.
///
/// Extract rows repeat the gauge coordinates on every reading; the
/// mean smooths occasional transcription jitter.
pub fn station_coordinates(readings: &[Reading]) -> BTreeMap<String, (f64, f64)> {
    readings
        .iter()
        .map(|r| (r.station.clone(), (r.latitude, r.longitude)))
        .into_group_map()
        .into_iter()
        .map(|(station, coords)| {
            let n = coords.len() as f64;
            let (lat_sum, lon_sum) = coords
                .iter()
                .fold((0.0, 0.0), |(la, lo), (lat, lon)| (la + lat, lo + lon));
            (station, (round3(lat_sum / n), round3(lon_sum / n)))
        })
        .collect()
}

/// Mean of the station coordinates, used to center maps and frames.
///
/// Returns None when there are no stations.
pub fn centroid(coordinates: &BTreeMap<String, (f64, f64)>) -> Option<(f64, f64)> {
    if coordinates.is_empty() {
        return None;
    }
    let n = coordinates.len() as f64;
    let (lat_sum, lon_sum) = coordinates
        .values()
        .fold((0.0, 0.0), |(la, lo), (lat, lon)| (la + lat, lo + lon));
    Some((lat_sum / n, lon_sum / n))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::parse_readings_csv;
    use chrono::NaiveDate;

    const EXTRACT: &str = include_str!("../../fixtures/readings-sample.csv");

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn reading(station: &str, lat: f64, lon: f64, ts: NaiveDateTime, mm: f64) -> Reading {
        Reading {
            station: station.to_string(),
            latitude: lat,
            longitude: lon,
            timestamp: ts,
            value_mm: mm,
        }
    }

    fn sample_readings() -> Vec<Reading> {
        parse_readings_csv(EXTRACT).unwrap()
    }

    #[test]
    fn test_hour_offset_floors_partial_hours() {
        let reference = at(2019, 6, 14, 10, 0);
        assert_eq!(hour_offset(reference, at(2019, 6, 14, 10, 0)), 0);
        assert_eq!(hour_offset(reference, at(2019, 6, 14, 9, 1)), 0);
        assert_eq!(hour_offset(reference, at(2019, 6, 14, 9, 0)), 1);
        assert_eq!(hour_offset(reference, at(2019, 6, 13, 10, 1)), 23);
        assert_eq!(hour_offset(reference, at(2019, 6, 13, 10, 0)), 24);
    }

    #[test]
    fn test_hour_offset_is_negative_for_future_readings() {
        let reference = at(2019, 6, 14, 10, 0);
        assert_eq!(hour_offset(reference, at(2019, 6, 14, 10, 30)), -1);
        assert_eq!(hour_offset(reference, at(2019, 6, 14, 11, 0)), -1);
        assert_eq!(hour_offset(reference, at(2019, 6, 14, 11, 1)), -2);
    }

    #[test]
    fn test_hour_offset_is_monotonic_in_age() {
        let reference = at(2019, 6, 14, 10, 0);
        let stamps = [
            at(2019, 6, 14, 10, 0),
            at(2019, 6, 14, 9, 30),
            at(2019, 6, 14, 2, 15),
            at(2019, 6, 13, 10, 1),
            at(2019, 6, 12, 0, 0),
        ];
        let offsets: Vec<i64> = stamps.iter().map(|ts| hour_offset(reference, *ts)).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_window_boundaries() {
        let reference = at(2019, 6, 14, 10, 0);
        // The reference instant itself is inside the window
        assert!(in_window(reference, reference));
        assert!(in_window(reference, at(2019, 6, 13, 10, 1)));
        // Exactly 24 hours old falls out
        assert!(!in_window(reference, at(2019, 6, 13, 10, 0)));
        assert!(!in_window(reference, at(2019, 6, 14, 10, 1)));
    }

    #[test]
    fn test_totals_by_station_over_sample_extract() {
        let readings = sample_readings();
        let reference = at(2019, 6, 14, 10, 0);
        let totals = totals_by_station(&readings, reference);
        assert_eq!(totals.len(), 3);
        assert!((totals["Bessa"] - 3.5).abs() < 1e-9);
        // The reading 24 hours before the reference is excluded
        assert!((totals["Mangabeira"] - 5.0).abs() < 1e-9);
        assert!((totals["Centro"] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_hourly_matrix_slots() {
        let readings = sample_readings();
        let reference = at(2019, 6, 14, 10, 0);
        let matrix = hourly_by_station(&readings, reference);

        let bessa = &matrix["Bessa"];
        assert_eq!(bessa[0], Some(2.5));
        assert_eq!(bessa[1], Some(1.0));
        assert_eq!(bessa[2], Some(0.0));
        assert_eq!(bessa[3], None);

        let centro = &matrix["Centro"];
        assert_eq!(centro[23], Some(5.0));

        // Mangabeira's day-old reading is outside the window
        let mangabeira = &matrix["Mangabeira"];
        assert_eq!(mangabeira[23], None);
    }

    #[test]
    fn test_same_hour_readings_sum_into_one_slot() {
        let reference = at(2019, 6, 14, 10, 0);
        let readings = vec![
            reading("Bessa", -7.1, -34.8, at(2019, 6, 14, 9, 10), 1.2),
            reading("Bessa", -7.1, -34.8, at(2019, 6, 14, 9, 40), 0.6),
        ];
        let matrix = hourly_by_station(&readings, reference);
        let slot = matrix["Bessa"][0].unwrap();
        assert!((slot - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_station_coordinates_are_rounded_means() {
        let ts = at(2019, 6, 14, 10, 0);
        let readings = vec![
            reading("Bessa", -7.1001, -34.8003, ts, 0.0),
            reading("Bessa", -7.1002, -34.8001, ts, 0.0),
        ];
        let coords = station_coordinates(&readings);
        let (lat, lon) = coords["Bessa"];
        assert!((lat - (-7.1)).abs() < 1e-9);
        assert!((lon - (-34.8)).abs() < 1e-9);
    }

    #[test]
    fn test_centroid() {
        let mut coords = BTreeMap::new();
        assert_eq!(centroid(&coords), None);
        coords.insert("A".to_string(), (0.0, 0.0));
        coords.insert("B".to_string(), (2.0, 2.0));
        let (lat, lon) = centroid(&coords).unwrap();
        assert!((lat - 1.0).abs() < 1e-9);
        assert!((lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_produces_no_totals() {
        let readings = sample_readings();
        let reference = at(2020, 1, 1, 0, 0);
        assert!(totals_by_station(&readings, reference).is_empty());
        assert!(hourly_by_station(&readings, reference).is_empty());
    }
}
