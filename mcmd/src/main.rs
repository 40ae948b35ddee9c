//! Command-line entry point running the tasks of a YAML configuration

use clap::Parser;
use color_eyre::eyre::Result;
use mcmd::config::RunConfig;
use mcmd::tasks::{run_lattice, run_md};
use tracing::info;

mod args;
mod output;

use args::Args;
use output::setup_logging;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    setup_logging(args.log_file.as_ref())?;

    info!("Reading configuration from: {}", args.config_file.display());
    let mut config = RunConfig::from_file(&args.config_file)?;
    if let Some(seed) = args.seed {
        info!("Overriding seed with: {}", seed);
        config.override_seed(seed);
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());
    info!("Configuration loaded:\n{:?}", config);
    info!("Data files will be written to: {}", output_dir.display());

    match &config.lattice {
        Some(lattice) if !args.skip_lattice => {
            run_lattice(lattice, &output_dir)?;
        }
        Some(_) => info!("Skipping lattice-gas task"),
        None => {}
    }

    match &config.molecular_dynamics {
        Some(md) if !args.skip_md => {
            run_md(md, &output_dir)?;
        }
        Some(_) => info!("Skipping molecular dynamics task"),
        None => {}
    }

    info!("All tasks finished");
    Ok(())
}
