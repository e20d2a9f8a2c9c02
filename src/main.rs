//! EncounterSim - Headless RPG Encounter Simulator
//!
//! Loads a scenario file, runs the encounter to completion, and writes a JSON
//! report of the outcome.

use std::process::ExitCode;

use encountersim::cli;
use encountersim::headless::{run_scenario, ScenarioConfig};

fn main() -> ExitCode {
    let args = cli::parse_args();

    let mut scenario = match ScenarioConfig::load_from_file(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(max_duration) = args.max_duration {
        scenario.max_duration = max_duration;
    }
    if let Some(seed) = args.seed {
        scenario.seed = Some(seed);
    }

    println!("Running scenario {} ...", args.scenario.display());
    println!("  Actors: {}", scenario.actors.len());
    println!("  Max duration: {:.0}s", scenario.max_duration);
    if let Some(seed) = scenario.seed {
        println!("  Seed: {}", seed);
    }

    let report = match run_scenario(&scenario) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Encounter failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match report.winning_team() {
        Some(team) => println!("Team {} wins after {:.1}s", team, report.duration),
        None => println!("Draw after {:.1}s", report.duration),
    }

    if let Err(e) = report.save_to_file(&args.output) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    println!("Report saved to {}", args.output.display());

    ExitCode::SUCCESS
}
