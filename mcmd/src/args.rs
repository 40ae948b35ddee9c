//! Command-line argument parsing

use clap::Parser;
use std::path::PathBuf;

/// Lattice-gas Monte Carlo and molecular dynamics driven by a YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: PathBuf,

    /// Override the directory receiving data files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write the log to this file instead of stdout
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// Override the random seed of every task
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the lattice-gas task
    #[arg(long)]
    pub skip_lattice: bool,

    /// Skip the molecular dynamics task
    #[arg(long)]
    pub skip_md: bool,
}
