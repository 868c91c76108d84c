//! Mapmaker CLI Binary
//!
//! Command-line interface for building and inspecting folder personas.

use anyhow::Context;
use clap::Parser;
use mapmaker::logging::init_logging;
use mapmaker::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: Cli) -> anyhow::Result<String> {
    let context = CliContext::new(cli.root.clone(), cli.config.clone(), cli.store.clone())
        .context("Error initializing mapmaker")?;

    let logging = cli.logging_config(&context.config().logging);
    init_logging(Some(&logging)).context("Error initializing logging")?;

    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
