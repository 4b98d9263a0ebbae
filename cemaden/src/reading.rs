use crate::error::{CemadenError, Result};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// Timestamp format used by the CEMADEN CSV extracts
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Expected number of CSV columns (eight data columns plus the
/// trailing empty one produced by the terminating semicolon)
pub const CSV_ROW_LENGTH: usize = 9;

/// One historical gauge reading from a CEMADEN CSV extract.
///
/// Extract rows are semicolon-delimited with the columns
/// municipality, station code, state, station name, latitude,
/// longitude, timestamp and measured value.
#[derive(Debug, PartialEq, Clone)]
pub struct Reading {
    /// Station display name, usually the neighborhood of the gauge
    pub station: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Measurement timestamp (CEMADEN reports UTC)
    pub timestamp: NaiveDateTime,
    /// Measured rainfall in mm
    pub value_mm: f64,
}

impl TryFrom<StringRecord> for Reading {
    type Error = CemadenError;

    fn try_from(value: StringRecord) -> Result<Self> {
        if value.len() != CSV_ROW_LENGTH {
            return Err(CemadenError::InvalidFormat(format!(
                "Expected {} columns, found {}",
                CSV_ROW_LENGTH,
                value.len()
            )));
        }

        let station = value
            .get(3)
            .ok_or_else(|| CemadenError::InvalidFormat("Missing station name".to_string()))?
            .trim()
            .to_string();

        let latitude = value
            .get(4)
            .ok_or_else(|| CemadenError::InvalidFormat("Missing latitude".to_string()))?
            .trim()
            .parse::<f64>()
            .map_err(|e| CemadenError::InvalidFormat(format!("Bad latitude: {}", e)))?;

        let longitude = value
            .get(5)
            .ok_or_else(|| CemadenError::InvalidFormat("Missing longitude".to_string()))?
            .trim()
            .parse::<f64>()
            .map_err(|e| CemadenError::InvalidFormat(format!("Bad longitude: {}", e)))?;

        let timestamp = NaiveDateTime::parse_from_str(
            value
                .get(6)
                .ok_or_else(|| CemadenError::InvalidFormat("Missing timestamp".to_string()))?
                .trim(),
            DATETIME_FORMAT,
        )
        .map_err(|e| CemadenError::DateParse(e.to_string()))?;

        let value_mm = value
            .get(7)
            .ok_or_else(|| CemadenError::InvalidFormat("Missing measured value".to_string()))?
            .trim()
            .parse::<f64>()
            .map_err(|e| CemadenError::InvalidFormat(format!("Bad measured value: {}", e)))?;

        Ok(Reading {
            station,
            latitude,
            longitude,
            timestamp,
            value_mm,
        })
    }
}

/// Parses a whole semicolon-delimited extract.
///
/// The extracts carry no header row. Any malformed row aborts the
/// parse with an error.
pub fn parse_readings_csv(data: &str) -> Result<Vec<Reading>> {
    let mut readings = Vec::new();
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_reader(data.as_bytes());
    for row in rdr.records() {
        let record = row?;
        readings.push(record.try_into()?);
    }
    Ok(readings)
}

/// Reads and parses a CSV extract from disk.
pub fn read_readings_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Reading>> {
    let data = std::fs::read_to_string(path)?;
    parse_readings_csv(&data)
}

#[cfg(test)]
mod tests {
    use super::{parse_readings_csv, Reading, DATETIME_FORMAT};
    use chrono::NaiveDateTime;

    const EXTRACT: &str = include_str!("../../fixtures/readings-sample.csv");

    #[test]
    fn test_parse_single_row() {
        let row = "JoãoPessoa;001;PB;Bessa;-7.1;-34.8;2019-06-14 10:00:00;2.5;\n";
        let readings = parse_readings_csv(row).unwrap();
        assert_eq!(readings.len(), 1);
        let expected = Reading {
            station: "Bessa".to_string(),
            latitude: -7.1,
            longitude: -34.8,
            timestamp: NaiveDateTime::parse_from_str("2019-06-14 10:00:00", DATETIME_FORMAT)
                .unwrap(),
            value_mm: 2.5,
        };
        assert_eq!(readings[0], expected);
    }

    #[test]
    fn test_parse_sample_extract() {
        let readings = parse_readings_csv(EXTRACT).unwrap();
        assert_eq!(readings.len(), 9);
        assert!(readings.iter().any(|r| r.station == "Mangabeira"));
        assert!(readings.iter().any(|r| r.station == "Centro"));
    }

    #[test]
    fn test_wrong_column_count_is_rejected() {
        let row = "JoãoPessoa;001;PB;Bessa;-7.1;-34.8;2019-06-14 10:00:00;2.5\n";
        assert!(parse_readings_csv(row).is_err());
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let row = "JoãoPessoa;001;PB;Bessa;-7.1;-34.8;14/06/2019 10:00;2.5;\n";
        assert!(parse_readings_csv(row).is_err());
    }

    #[test]
    fn test_bad_value_is_rejected() {
        let row = "JoãoPessoa;001;PB;Bessa;-7.1;-34.8;2019-06-14 10:00:00;muito;\n";
        assert!(parse_readings_csv(row).is_err());
    }
}
