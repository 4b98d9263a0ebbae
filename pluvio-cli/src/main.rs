//! pluvio CLI - browse CEMADEN rain gauges and build rainfall maps.

use clap::Parser;

#[derive(Parser)]
#[command(name = "pluvio-cli", version, about = "CEMADEN rain gauge data toolkit")]
struct Cli {
    #[command(subcommand)]
    command: pluvio_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    pluvio_cmd::run(cli.command).await
}
