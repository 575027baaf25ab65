mod cli;
mod logging;
mod report;

use std::process;

use anyhow::Result;
use breeding_kpi::config::Settings;
use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {e}");
            process::exit(1);
        }
    };
    logging::init(cli.verbose, &settings.logging);

    if let Err(e) = run(cli, settings).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let output = report::run(cli.command, settings).await?;
    println!("{output}");
    Ok(())
}
