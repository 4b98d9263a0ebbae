//! Command implementations behind the pluvio CLI.
//!
//! Each subcommand lives in its own module; [`run`] dispatches to them.

use clap::Subcommand;

pub mod map;
pub mod menu;
pub mod monitor;

#[derive(Subcommand)]
pub enum Command {
    /// Browse CEMADEN stations for a state interactively
    Monitor {
        /// Two-letter state code whose stations are fetched
        #[arg(short, long, default_value = "PB")]
        state: String,

        /// Directory where station charts are written
        #[arg(short, long, default_value = ".")]
        out_dir: String,

        /// Skip opening charts in the browser
        #[arg(long)]
        no_open: bool,
    },
    /// Build an interactive rainfall map from a readings CSV
    Map {
        /// Semicolon-separated CEMADEN readings export
        #[arg(short, long)]
        readings_csv: String,

        /// GeoJSON file with the municipal boundary
        #[arg(short, long)]
        boundary: String,

        /// Path of the HTML map to write
        #[arg(short, long, default_value = "index.html")]
        output: String,

        /// Year of the simulated reference time
        #[arg(long, default_value_t = 2019)]
        year: i32,

        /// Month of the simulated reference time
        #[arg(long, default_value_t = 6)]
        month: u32,

        /// Half-width in degrees of the Voronoi frame around the gauges
        #[arg(long, default_value_t = 1.0)]
        frame_radius: f64,

        /// Also write an SVG preview of the clipped partition
        #[arg(long)]
        partition_svg: Option<String>,

        /// Skip opening the map in the browser
        #[arg(long)]
        no_open: bool,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Monitor {
            state,
            out_dir,
            no_open,
        } => monitor::run_monitor(&state, &out_dir, no_open).await,
        Command::Map {
            readings_csv,
            boundary,
            output,
            year,
            month,
            frame_radius,
            partition_svg,
            no_open,
        } => {
            let args = map::MapArgs {
                readings_csv,
                boundary,
                output,
                year,
                month,
                frame_radius,
                partition_svg,
                no_open,
            };
            map::run_map(&args)
        }
    }
}
