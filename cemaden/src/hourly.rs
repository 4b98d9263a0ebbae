use crate::error::{CemadenError, Result};
use serde::Deserialize;

#[cfg(feature = "api")]
use log::info;
#[cfg(feature = "api")]
use reqwest::Client;

/// Per-station hourly series endpoint
pub const HOURLY_SERIES_URL: &str =
    "http://sjc.salvar.cemaden.gov.br/WebServiceSalvar-war/resources/horario";

/// Number of hours back requested from the hourly endpoint
pub const HOURS_BACK: u32 = 23;

/// Builds the request URL for one station's hourly series.
pub fn series_url(station_id: u32) -> String {
    format!("{}/{}/{}", HOURLY_SERIES_URL, station_id, HOURS_BACK)
}

/// Raw hourly series payload for one station.
///
/// The endpoint returns an hour-by-date matrix in column-major order:
/// `values` holds one inner vector per date, each with one entry per
/// hour label. Hours without a reading are null.
#[derive(Debug, PartialEq, Clone, Deserialize)]
pub struct HourlySeries {
    /// Hour-of-day row labels ("00:00" through "23:00")
    #[serde(rename = "horarios")]
    pub hours: Vec<String>,
    /// Date column labels
    #[serde(rename = "datas")]
    pub dates: Vec<String>,
    /// One inner vector per date, each holding one value per hour
    #[serde(rename = "acumulados")]
    pub values: Vec<Vec<Option<f64>>>,
}

#[cfg(feature = "api")]
impl HourlySeries {
    /// Fetches the hourly series for one station.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `station_id` - Numeric station identifier
    pub async fn fetch(client: &Client, station_id: u32) -> Result<Self> {
        let url = series_url(station_id);
        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CemadenError::ResponseParse(format!(
                "status {} from {}",
                status, url
            )));
        }
        let body = response.text().await?;
        let series: HourlySeries = serde_json::from_str(&body)?;
        info!(
            "hourly series fetched for station {}: {} dates",
            station_id,
            series.dates.len()
        );
        Ok(series)
    }
}

/// Hour-by-date rainfall table in display order, with a running
/// accumulated column.
#[derive(Debug, PartialEq, Clone)]
pub struct HourlyTable {
    /// Hour-of-day row labels
    pub hours: Vec<String>,
    /// Date column labels
    pub dates: Vec<String>,
    /// Row-major cells, `rows[hour][date]`
    pub rows: Vec<Vec<Option<f64>>>,
    /// Running sum of per-row totals, one entry per hour label
    pub accumulated: Vec<f64>,
}

impl TryFrom<HourlySeries> for HourlyTable {
    type Error = CemadenError;

    fn try_from(series: HourlySeries) -> Result<Self> {
        if series.values.len() != series.dates.len() {
            return Err(CemadenError::RaggedSeries {
                expected: series.dates.len(),
                found: series.values.len(),
            });
        }
        for column in &series.values {
            if column.len() != series.hours.len() {
                return Err(CemadenError::RaggedSeries {
                    expected: series.hours.len(),
                    found: column.len(),
                });
            }
        }

        let rows: Vec<Vec<Option<f64>>> = (0..series.hours.len())
            .map(|hour| series.values.iter().map(|column| column[hour]).collect())
            .collect();

        let mut accumulated = Vec::with_capacity(rows.len());
        let mut running = 0.0;
        for row in &rows {
            running += row.iter().flatten().sum::<f64>();
            accumulated.push(running);
        }

        Ok(HourlyTable {
            hours: series.hours,
            dates: series.dates,
            rows,
            accumulated,
        })
    }
}

impl HourlyTable {
    /// Total rainfall for one hour row, treating missing cells as zero.
    pub fn row_total(&self, row: usize) -> f64 {
        self.rows
            .get(row)
            .map(|cells| cells.iter().flatten().sum())
            .unwrap_or(0.0)
    }

    /// Renders the table as aligned text for terminal display.
    ///
    /// Missing cells print as "-".
    pub fn render_text(&self) -> String {
        let hour_width = self
            .hours
            .iter()
            .map(|h| h.len())
            .chain([4])
            .max()
            .unwrap_or(4);
        let date_widths: Vec<usize> = self.dates.iter().map(|d| d.len().max(6)).collect();

        let mut out = String::new();
        out.push_str(&format!("{:<width$}", "Hour", width = hour_width));
        for (date, width) in self.dates.iter().zip(&date_widths) {
            out.push_str(&format!("  {:>width$}", date, width = width));
        }
        out.push_str("  Accumulated\n");

        for (i, hour) in self.hours.iter().enumerate() {
            out.push_str(&format!("{:<width$}", hour, width = hour_width));
            for (j, width) in date_widths.iter().enumerate() {
                match self.rows[i][j] {
                    Some(v) => out.push_str(&format!("  {:>width$.1}", v, width = width)),
                    None => out.push_str(&format!("  {:>width$}", "-", width = width)),
                }
            }
            out.push_str(&format!("  {:>11.1}\n", self.accumulated[i]));
        }
        out
    }
}
