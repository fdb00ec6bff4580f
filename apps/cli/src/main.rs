//! reportpipe CLI — ops & billing companion for the research-report pipeline.
//!
//! Bootstraps the pipeline workspace and turns per-run token telemetry into
//! cost estimates, monthly projections, and tier comparisons.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
