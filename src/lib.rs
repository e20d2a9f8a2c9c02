//! EncounterSim - Headless RPG Encounter Simulator
//!
//! A gameplay core for data-driven abilities and real-time combat: targeting
//! and effect pipelines, auto-attacking fighters, projectiles, patrol AI, and
//! stat progression, driven headlessly from scripted scenario files.
//!
//! This library exposes the core modules for testing and reuse.

pub mod abilities;
pub mod cli;
pub mod combat;
pub mod constants;
pub mod headless;
pub mod saving;
pub mod stats;

// Re-export commonly used types
pub use abilities::{AbilityDefinitions, AbilityKey};
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::CombatPlugin;
pub use headless::{EncounterReport, ScenarioConfig};
pub use stats::CharacterClass;
