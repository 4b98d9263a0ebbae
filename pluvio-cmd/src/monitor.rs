//! Interactive browser over the CEMADEN station list.
//!
//! Fetches every gauge of one state up front, then loops over a numeric
//! menu until the user quits: full station table, municipality listing,
//! per-municipality filter, one-station summary, and a chart of the last
//! 24 hours written as an SVG into `out_dir`.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use cemaden::hourly::{HourlySeries, HourlyTable};
use cemaden::station::{Station, ACCUMULATION_HOURS};
use reqwest::Client;

use crate::menu;

const MENU_OPTIONS: [u32; 6] = [1, 2, 3, 4, 5, 9];
const QUIT: u32 = 9;
const BACK: u32 = 0;

/// Runs the monitor loop until the user picks option 9.
pub async fn run_monitor(state: &str, out_dir: &str, no_open: bool) -> anyhow::Result<()> {
    let client = Client::new();
    let stations = Station::fetch_state(&client, state)
        .await
        .with_context(|| format!("fetching the station list for {state}"))?;
    if stations.is_empty() {
        anyhow::bail!("CEMADEN returned no stations for {state}");
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    writeln!(output, "{} stations reported for {}.", stations.len(), state)?;
    writeln!(output, "CEMADEN reports all timestamps in UTC.")?;
    writeln!(output, "Local time in Paraíba runs three hours behind UTC.")?;

    loop {
        writeln!(output, "{}", menu_text())?;
        let option =
            menu::prompt_from_set(&mut input, &mut output, "Chosen option: ", &MENU_OPTIONS, QUIT)?;
        match option {
            1 => writeln!(output, "{}", render_station_table(&stations))?,
            2 => writeln!(output, "{}", render_municipalities(&stations))?,
            3 => {
                let mut allowed: Vec<u32> =
                    Station::municipalities(&stations).keys().copied().collect();
                allowed.push(BACK);
                let code = menu::prompt_from_set(
                    &mut input,
                    &mut output,
                    "Municipality code (0 to go back): ",
                    &allowed,
                    BACK,
                )?;
                if code != BACK {
                    writeln!(output, "{}", render_municipality_stations(&stations, code))?;
                }
            }
            4 | 5 => {
                let mut allowed = Station::ids(&stations);
                allowed.push(BACK);
                let id = menu::prompt_from_set(
                    &mut input,
                    &mut output,
                    "Station id (0 to go back): ",
                    &allowed,
                    BACK,
                )?;
                if id == BACK {
                    continue;
                }
                let station = Station::by_id(&stations, id)?;
                if option == 4 {
                    writeln!(output, "{}", render_station_summary(station))?;
                } else {
                    show_last_24_hours(&client, station, out_dir, no_open).await?;
                }
            }
            _ => break,
        }
    }
    Ok(())
}

fn menu_text() -> String {
    [
        "",
        "1 - List every station",
        "2 - List the municipalities covered",
        "3 - List the stations of one municipality",
        "4 - Show one station in detail",
        "5 - Chart the last 24 hours of one station",
        "9 - Quit",
    ]
    .join("\n")
}

/// Header plus one line per station: id, name, municipality and the
/// latest reading, `-` while the gauge is offline.
fn render_station_table(stations: &[Station]) -> String {
    let all: Vec<&Station> = stations.iter().collect();
    station_rows(&all)
}

fn render_municipalities(stations: &[Station]) -> String {
    Station::municipalities(stations)
        .iter()
        .map(|(code, city)| format!("{code} - {city}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_municipality_stations(stations: &[Station], city_code: u32) -> String {
    let selected = Station::in_municipality(stations, city_code);
    if selected.is_empty() {
        format!("No station found for municipality {city_code}.")
    } else {
        station_rows(&selected)
    }
}

fn station_rows(stations: &[&Station]) -> String {
    let name_width = stations
        .iter()
        .map(|station| station.name.len())
        .chain([4])
        .max()
        .unwrap_or(4);
    let city_width = stations
        .iter()
        .map(|station| station.city.len())
        .chain([4])
        .max()
        .unwrap_or(4);

    let mut table = format!(
        "{:>6}  {:<name_width$}  {:<city_width$}  {:>7}",
        "id", "name", "city", "last mm"
    );
    for station in stations {
        let last = match station.last_value {
            Some(value) => format!("{value:.1}"),
            None => "-".to_string(),
        };
        table.push_str(&format!(
            "\n{:>6}  {:<name_width$}  {:<city_width$}  {:>7}",
            station.id, station.name, station.city, last
        ));
    }
    table
}

/// Multi-line summary of one station, every accumulation window included.
fn render_station_summary(station: &Station) -> String {
    let mut summary = format!("Station : {} ({})", station.name, station.code);
    summary.push_str(&format!(
        "\nCity    : {} - {} ({})",
        station.city, station.state, station.city_code
    ));
    summary.push_str(&format!(
        "\nPosition: {:.3}, {:.3}",
        station.latitude, station.longitude
    ));
    match (station.last_value, station.last_value_at.as_deref()) {
        (Some(value), Some(at)) => summary.push_str(&format!("\nLast    : {value:.1} mm at {at}")),
        (Some(value), None) => summary.push_str(&format!("\nLast    : {value:.1} mm")),
        _ => summary.push_str("\nLast    : no recent reading"),
    }
    for hours in ACCUMULATION_HOURS {
        match station.accumulated.window(hours) {
            Some(value) => {
                summary.push_str(&format!("\nAccumulated over {hours:>2} h: {value:.1} mm"))
            }
            None => summary.push_str(&format!("\nAccumulated over {hours:>2} h: -")),
        }
    }
    summary
}

/// Fetches the hourly series of one station, prints it as a table and
/// writes the chart to `out_dir`.
async fn show_last_24_hours(
    client: &Client,
    station: &Station,
    out_dir: &str,
    no_open: bool,
) -> anyhow::Result<()> {
    let series = HourlySeries::fetch(client, station.id)
        .await
        .with_context(|| format!("fetching the hourly series for station {}", station.id))?;
    let table = HourlyTable::try_from(series)?;
    println!("{}", table.render_text());

    let svg = pluvio_chart::station_chart_svg(&table, &station.name)?;
    let path = Path::new(out_dir).join(format!("station-{}-24h.svg", station.id));
    std::fs::write(&path, svg).with_context(|| format!("writing {}", path.display()))?;
    log::info!("chart written to {}", path.display());
    if !no_open {
        open_in_browser(&path);
    }
    Ok(())
}

/// Opens `path` in the default browser; failures are only logged so a
/// headless run still produces the file.
pub(crate) fn open_in_browser(path: &Path) {
    let target = match path.canonicalize() {
        Ok(absolute) => format!("file://{}", absolute.display()),
        Err(_) => path.display().to_string(),
    };
    if let Err(error) = webbrowser::open(&target) {
        log::warn!("could not open {target}: {error}");
    }
}
