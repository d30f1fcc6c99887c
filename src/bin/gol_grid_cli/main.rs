mod convert;
mod run;
mod stats;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};
use convert::{run_convert, ConvertArgs};
use run::{run_simulation, RunArgs};
use stats::{run_stats, StatsArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about)]
struct CLIParser {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Run the simulation and print every generation to the terminal
    Run(RunArgs),
    /// Convert a pattern between formats, optionally fitting it to a tiling
    Convert(ConvertArgs),
    /// Compute pattern's dimensions, hash and population
    Stats(StatsArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CLIParser::parse();

    match args.action {
        Action::Run(args) => run_simulation(args),
        Action::Convert(args) => run_convert(args),
        Action::Stats(args) => run_stats(args),
    }
}
