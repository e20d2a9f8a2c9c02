//! Command-line interface for the encounter simulator

use clap::Parser;
use std::path::PathBuf;

/// Headless RPG encounter simulator
#[derive(Parser, Debug)]
#[command(name = "encountersim")]
#[command(about = "Headless RPG encounter simulator")]
#[command(version)]
pub struct Args {
    /// Scenario RON file describing the encounter
    #[arg(value_name = "SCENARIO_FILE")]
    pub scenario: PathBuf,

    /// Output path for the encounter report
    #[arg(long, value_name = "OUTPUT_PATH", default_value = "encounter_result.json")]
    pub output: PathBuf,

    /// Maximum encounter duration in seconds (overrides the scenario)
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for deterministic replay (overrides the scenario)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
