//! Command-line interface for Riftbound
//!
//! Supports both graphical (default) and headless modes.

use clap::Parser;
use std::path::PathBuf;

/// Action RPG combat prototype
#[derive(Parser, Debug)]
#[command(name = "riftbound")]
#[command(about = "Action RPG combat prototype")]
#[command(version)]
pub struct Args {
    /// Run in headless mode with the specified JSON scenario file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the scenario report (headless mode only)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Override the scenario duration in seconds (headless mode only)
    #[arg(long)]
    pub duration: Option<f32>,

    /// Random seed for deterministic scenarios (headless mode only)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
