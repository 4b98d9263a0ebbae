use crate::de;
use crate::error::{CemadenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "api")]
use log::info;
#[cfg(feature = "api")]
use reqwest::Client;

/// Station-list endpoint of the interactive CEMADEN map
pub const STATION_LIST_URL: &str =
    "http://sjc.salvar.cemaden.gov.br/resources/graficos/interativo/getJson2.php";

/// Accumulation horizons reported per station, in hours
pub const ACCUMULATION_HOURS: [u32; 8] = [1, 3, 6, 12, 24, 48, 72, 96];

/// Represents one automatic CEMADEN rain gauge.
///
/// The station list is served per state and carries the gauge metadata
/// together with the most recent reading and a set of windowed
/// accumulations maintained by CEMADEN itself.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Numeric identifier used by the hourly-series endpoint
    #[serde(rename = "idestacao", deserialize_with = "de::flex_u32")]
    pub id: u32,
    /// Alphanumeric station code (e.g., "250750801A")
    #[serde(rename = "codestacao", default)]
    pub code: String,
    /// Display name, usually the neighborhood of the gauge
    #[serde(rename = "nomeestacao")]
    pub name: String,
    /// Municipality the gauge belongs to
    #[serde(rename = "cidade")]
    pub city: String,
    /// IBGE code of the municipality
    #[serde(rename = "codibge", deserialize_with = "de::flex_u32")]
    pub city_code: u32,
    /// Two-letter state code
    #[serde(rename = "uf", default)]
    pub state: String,
    /// Latitude in decimal degrees
    #[serde(deserialize_with = "de::flex_f64")]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(deserialize_with = "de::flex_f64")]
    pub longitude: f64,
    /// Most recent reading in mm, None while the gauge is offline
    #[serde(rename = "ultimovalor", default, deserialize_with = "de::flex_f64_opt")]
    pub last_value: Option<f64>,
    /// Timestamp of the most recent reading, as reported by the API
    #[serde(rename = "datahoraUltimovalor", default)]
    pub last_value_at: Option<String>,
    #[serde(flatten)]
    pub accumulated: Accumulations,
}

/// Windowed rainfall accumulations maintained server-side per gauge.
#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Accumulations {
    #[serde(rename = "acc1hr", default, deserialize_with = "de::flex_f64_opt")]
    pub one_hour: Option<f64>,
    #[serde(rename = "acc3hr", default, deserialize_with = "de::flex_f64_opt")]
    pub three_hours: Option<f64>,
    #[serde(rename = "acc6hr", default, deserialize_with = "de::flex_f64_opt")]
    pub six_hours: Option<f64>,
    #[serde(rename = "acc12hr", default, deserialize_with = "de::flex_f64_opt")]
    pub twelve_hours: Option<f64>,
    #[serde(rename = "acc24hr", default, deserialize_with = "de::flex_f64_opt")]
    pub one_day: Option<f64>,
    #[serde(rename = "acc48hr", default, deserialize_with = "de::flex_f64_opt")]
    pub two_days: Option<f64>,
    #[serde(rename = "acc72hr", default, deserialize_with = "de::flex_f64_opt")]
    pub three_days: Option<f64>,
    #[serde(rename = "acc96hr", default, deserialize_with = "de::flex_f64_opt")]
    pub four_days: Option<f64>,
}

impl Accumulations {
    /// Returns the accumulation for one of the horizons in
    /// [`ACCUMULATION_HOURS`], or None for any other window.
    pub fn window(&self, hours: u32) -> Option<f64> {
        match hours {
            1 => self.one_hour,
            3 => self.three_hours,
            6 => self.six_hours,
            12 => self.twelve_hours,
            24 => self.one_day,
            48 => self.two_days,
            72 => self.three_days,
            96 => self.four_days,
            _ => None,
        }
    }
}

impl Station {
    /// Parse the JSON station list served by [`STATION_LIST_URL`].
    pub fn parse_station_list(json: &str) -> Result<Vec<Station>> {
        let stations: Vec<Station> = serde_json::from_str(json)?;
        Ok(stations)
    }

    /// Municipalities present in the station list, keyed by IBGE code.
    pub fn municipalities(stations: &[Station]) -> BTreeMap<u32, String> {
        let mut cities = BTreeMap::new();
        for station in stations {
            cities
                .entry(station.city_code)
                .or_insert_with(|| station.city.clone());
        }
        cities
    }

    /// Stations belonging to one municipality.
    pub fn in_municipality(stations: &[Station], city_code: u32) -> Vec<&Station> {
        stations
            .iter()
            .filter(|s| s.city_code == city_code)
            .collect()
    }

    /// Looks a station up by its numeric identifier.
    pub fn by_id(stations: &[Station], id: u32) -> Result<&Station> {
        stations
            .iter()
            .find(|s| s.id == id)
            .ok_or(CemadenError::StationNotFound(id))
    }

    /// Station identifiers in list order.
    pub fn ids(stations: &[Station]) -> Vec<u32> {
        stations.iter().map(|s| s.id).collect()
    }
}

#[cfg(feature = "api")]
impl Station {
    /// Fetches the station list for one state.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `state` - Two-letter state code (e.g., "PB")
    pub async fn fetch_state(client: &Client, state: &str) -> Result<Vec<Station>> {
        let url = format!("{}?uf={}", STATION_LIST_URL, state);
        let response = client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CemadenError::ResponseParse(format!(
                "status {} from {}",
                status, url
            )));
        }
        let body = response.text().await?;
        let stations = Self::parse_station_list(&body)?;
        info!("{} stations fetched for {}", stations.len(), state);
        Ok(stations)
    }
}
