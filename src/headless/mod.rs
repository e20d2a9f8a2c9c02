//! Headless encounter simulation
//!
//! Runs scripted encounters without any graphical output, suitable for
//! automated balance testing and regression runs.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- scenarios/duel.ron --output result.json
//! ```
//!
//! ## Scenario format (RON)
//!
//! ```ron
//! (
//!     seed: Some(42),
//!     max_duration: 120.0,
//!     actors: [
//!         (name: "Hero", team: 1, class: Player, position: (0.0, 0.0, 0.0)),
//!         (name: "Grunt", team: 2, class: Grunt, position: (8.0, 0.0, 0.0),
//!          ai: Some(())),
//!     ],
//!     script: [
//!         (at: 1.0, action: Cast(caster: "Hero", ability: "fireball")),
//!         (at: 1.5, action: PointerClick(point: Some((8.0, 0.0, 0.0)))),
//!     ],
//! )
//! ```

pub mod config;
pub mod runner;

pub use config::{ScenarioConfig, ScriptAction, ScriptedAction};
pub use runner::{run_scenario, EncounterOutcome, EncounterReport};
